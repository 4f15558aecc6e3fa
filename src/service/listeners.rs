//! Status listeners and their fan-out.
//!
//! Listeners are notified synchronously on the caller's thread. The registry
//! has set semantics keyed on the listener allocation: registering the same
//! `Arc` twice keeps one entry, and removing an unknown listener does nothing.
//!
//! A listener that returns an error is logged and skipped; the remaining
//! listeners still receive the event.

use crate::error::Result;
use crate::status::AlarmStatus;
use log::{info, warn};
use std::sync::Arc;

/// Observer of security service events. Every callback defaults to a no-op so
/// implementations only override what they display.
pub trait StatusListener: Send + Sync {
    /// Alarm status was written. Fires for writes of an unchanged value too.
    fn notify(&self, _status: AlarmStatus) -> Result<()> {
        Ok(())
    }

    /// A camera frame was classified.
    fn cat_detected(&self, _cat: bool) -> Result<()> {
        Ok(())
    }

    /// Arming status changed; sensor states may have been reset.
    fn sensor_status_changed(&self) -> Result<()> {
        Ok(())
    }
}

/// Registered listeners, in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<Arc<dyn StatusListener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the listener was already registered.
    pub fn add(&mut self, listener: Arc<dyn StatusListener>) -> bool {
        if self.contains(&listener) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Returns false if the listener was not registered.
    pub fn remove(&mut self, listener: &Arc<dyn StatusListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Arc::ptr_eq(l, listener));
        self.listeners.len() != before
    }

    pub fn contains(&self, listener: &Arc<dyn StatusListener>) -> bool {
        self.listeners.iter().any(|l| Arc::ptr_eq(l, listener))
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn alarm_status_changed(&self, status: AlarmStatus) {
        self.dispatch("notify", |l| l.notify(status));
    }

    pub fn cat_detected(&self, cat: bool) {
        self.dispatch("cat_detected", |l| l.cat_detected(cat));
    }

    pub fn sensor_status_changed(&self) {
        self.dispatch("sensor_status_changed", |l| l.sensor_status_changed());
    }

    fn dispatch(&self, event: &str, call: impl Fn(&dyn StatusListener) -> Result<()>) {
        for (index, listener) in self.listeners.iter().enumerate() {
            if let Err(e) = call(listener.as_ref()) {
                warn!("Listener #{} failed on {}: {}", index, event, e);
            }
        }
    }
}

/// Listener that reports every event through the `log` facade.
///
/// This is the panel's status display when running headless.
#[derive(Debug, Default)]
pub struct LoggingListener {
    panel: String,
}

impl LoggingListener {
    pub fn new(panel: impl Into<String>) -> Self {
        Self {
            panel: panel.into(),
        }
    }
}

impl StatusListener for LoggingListener {
    fn notify(&self, status: AlarmStatus) -> Result<()> {
        info!("[{}] System status: {} ({})", self.panel, status.description(), status);
        Ok(())
    }

    fn cat_detected(&self, cat: bool) -> Result<()> {
        if cat {
            info!("[{}] DANGER - CAT DETECTED", self.panel);
        } else {
            info!("[{}] Camera clear: no cats detected", self.panel);
        }
        Ok(())
    }

    fn sensor_status_changed(&self) -> Result<()> {
        info!("[{}] Sensor states refreshed", self.panel);
        Ok(())
    }
}

//! The security service: the panel's alarm decision engine.
//!
//! Three kinds of events drive the alarm status:
//! - arming changes from the control panel ([`SecurityService::set_arming_status`])
//! - camera frames ([`SecurityService::process_image`])
//! - sensor activation changes ([`SecurityService::change_sensor_activation_status`])
//!
//! Current statuses and sensors are always read from the repository. The only
//! state the engine keeps itself is the verdict for the last classified frame,
//! which decides whether arming at home raises the alarm immediately.
//!
//! The engine is single-threaded (`&mut self`). Share it between actors through
//! [`SharedSecurityService`] so every operation runs to completion under one lock.

pub mod listeners;

pub use listeners::{ListenerRegistry, LoggingListener, StatusListener};

use crate::classifier::{CAT_CONFIDENCE_THRESHOLD, ImageClassifier};
use crate::repository::SecurityRepository;
use crate::sensors::Sensor;
use crate::status::{AlarmStatus, ArmingStatus};
use image::DynamicImage;
use log::{debug, info};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Security service shared between the console, simulation and other actors.
pub type SharedSecurityService = Arc<Mutex<SecurityService>>;

pub struct SecurityService {
    repository: Arc<dyn SecurityRepository>,
    classifier: Arc<dyn ImageClassifier>,
    listeners: ListenerRegistry,
    /// Verdict of the last classified frame.
    cat_detected: bool,
}

impl SecurityService {
    pub fn new(
        repository: Arc<dyn SecurityRepository>,
        classifier: Arc<dyn ImageClassifier>,
    ) -> Self {
        Self {
            repository,
            classifier,
            listeners: ListenerRegistry::new(),
            cat_detected: false,
        }
    }

    pub fn into_shared(self) -> SharedSecurityService {
        Arc::new(Mutex::new(self))
    }

    /// Register a listener. Registering the same listener twice has no effect.
    pub fn add_status_listener(&mut self, listener: Arc<dyn StatusListener>) {
        self.listeners.add(listener);
    }

    /// Unregister a listener. Unknown listeners are ignored.
    pub fn remove_status_listener(&mut self, listener: &Arc<dyn StatusListener>) {
        self.listeners.remove(listener);
    }

    /// Change the arming status.
    ///
    /// - Arming at home right after a cat was seen raises the alarm.
    /// - Disarming clears the alarm.
    /// - Any other arming resets every sensor to inactive. Each reset goes
    ///   through [`Self::change_sensor_activation_status`], so a previously
    ///   active sensor de-escalates the alarm on the way.
    ///
    /// Listeners get `sensor_status_changed` afterwards in every case.
    pub fn set_arming_status(&mut self, status: ArmingStatus) {
        info!("Arming status -> {}", status);

        if status == ArmingStatus::ArmedHome && self.cat_detected {
            self.set_alarm_status(AlarmStatus::Alarm);
        } else if status == ArmingStatus::Disarmed {
            self.set_alarm_status(AlarmStatus::NoAlarm);
        } else {
            for sensor in self.repository.sensors() {
                self.change_sensor_activation_status(&sensor, false);
            }
        }

        self.repository.set_arming_status(status);
        self.listeners.sensor_status_changed();
    }

    /// Classify a camera frame and update the alarm status from the verdict.
    ///
    /// The classifier always gets [`CAT_CONFIDENCE_THRESHOLD`].
    ///
    /// A cat while armed at home raises the alarm. Without a cat the alarm is
    /// cleared only when no sensor is active; otherwise it is left as is.
    pub fn process_image(&mut self, image: &DynamicImage) {
        let cat = self
            .classifier
            .image_contains_cat(image, CAT_CONFIDENCE_THRESHOLD);
        self.cat_detected = cat;

        let status = if cat && self.repository.arming_status() == ArmingStatus::ArmedHome {
            AlarmStatus::Alarm
        } else if self.repository.sensors().iter().any(Sensor::is_active) {
            self.repository.alarm_status()
        } else {
            AlarmStatus::NoAlarm
        };

        self.set_alarm_status(status);
        self.listeners.cat_detected(cat);
    }

    /// Record a sensor's new activation state and adjust the alarm status.
    ///
    /// Activation escalates one step, including re-activation of a sensor that
    /// is already active, unless the system is disarmed. Deactivation
    /// de-escalates one step only if the sensor was recorded active. Nothing
    /// escalates past `Alarm`. The sensor's state is stored in every case,
    /// disarmed or not.
    pub fn change_sensor_activation_status(&mut self, sensor: &Sensor, active: bool) {
        let was_active = self
            .repository
            .find_sensor(sensor)
            .map(|stored| stored.is_active())
            .unwrap_or_else(|| sensor.is_active());

        match self.repository.alarm_status() {
            AlarmStatus::NoAlarm | AlarmStatus::PendingAlarm => {
                if active {
                    self.handle_sensor_activated();
                } else if was_active {
                    self.handle_sensor_deactivated();
                }
            }
            // Already at the top: activation cannot escalate further.
            AlarmStatus::Alarm => {
                if was_active && !active {
                    self.handle_sensor_deactivated();
                }
            }
        }

        let mut updated = sensor.clone();
        updated.set_active(active);
        debug!(
            "Sensor {} ({}) active: {} -> {}",
            updated.name(),
            updated.sensor_type(),
            was_active,
            active
        );
        self.repository.update_sensor(&updated);
    }

    /// Write the alarm status and notify listeners, even if it is unchanged.
    pub fn set_alarm_status(&mut self, status: AlarmStatus) {
        info!("Alarm status -> {}", status);
        self.repository.set_alarm_status(status);
        self.listeners.alarm_status_changed(status);
    }

    fn handle_sensor_activated(&mut self) {
        if self.repository.arming_status() == ArmingStatus::Disarmed {
            return;
        }
        let current = self.repository.alarm_status();
        if current != AlarmStatus::Alarm {
            self.set_alarm_status(current.escalated());
        }
    }

    fn handle_sensor_deactivated(&mut self) {
        let current = self.repository.alarm_status();
        if current != AlarmStatus::NoAlarm {
            self.set_alarm_status(current.deescalated());
        }
    }

    pub fn alarm_status(&self) -> AlarmStatus {
        self.repository.alarm_status()
    }

    pub fn arming_status(&self) -> ArmingStatus {
        self.repository.arming_status()
    }

    /// Verdict of the last classified frame; false until a frame is processed.
    pub fn is_cat_detected(&self) -> bool {
        self.cat_detected
    }

    pub fn sensors(&self) -> BTreeSet<Sensor> {
        self.repository.sensors()
    }

    /// Sensors are unique by name in the panel's UI; first match wins.
    pub fn find_sensor_by_name(&self, name: &str) -> Option<Sensor> {
        self.repository
            .sensors()
            .into_iter()
            .find(|sensor| sensor.name().eq_ignore_ascii_case(name))
    }

    pub fn add_sensor(&mut self, sensor: Sensor) {
        info!("Adding sensor {} ({})", sensor.name(), sensor.sensor_type());
        self.repository.add_sensor(sensor);
    }

    pub fn remove_sensor(&mut self, sensor: &Sensor) {
        info!("Removing sensor {} ({})", sensor.name(), sensor.sensor_type());
        self.repository.remove_sensor(sensor);
    }
}

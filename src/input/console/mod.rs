//! Line-oriented control console.
//!
//! Takes the place of the panel's display, control, sensor and camera views:
//! each line is parsed into a [`Command`] and applied to the shared security
//! service. Status notifications are collected by a [`DisplayListener`] and
//! written out after the command that caused them.

pub mod command;

pub use command::{Command, FrameSource, HELP};

use crate::classifier::{blank_frame, load_image};
use crate::error::{Result, SecurityError};
use crate::sensors::Sensor;
use crate::service::{SharedSecurityService, StatusListener};
use crate::status::AlarmStatus;
use log::{debug, warn};
use parking_lot::Mutex;
use std::io::{BufRead, Write};
use std::sync::Arc;

/// Collects status notifications as display lines.
#[derive(Debug, Default)]
pub struct DisplayListener {
    lines: Mutex<Vec<String>>,
}

impl DisplayListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all lines collected since the last call.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }
}

impl StatusListener for DisplayListener {
    fn notify(&self, status: AlarmStatus) -> Result<()> {
        self.lines
            .lock()
            .push(format!("System Status: {}", status.description()));
        Ok(())
    }

    fn cat_detected(&self, cat: bool) -> Result<()> {
        let line = if cat {
            "DANGER - CAT DETECTED"
        } else {
            "Camera Feed: no cats detected"
        };
        self.lines.lock().push(line.to_string());
        Ok(())
    }

    fn sensor_status_changed(&self) -> Result<()> {
        self.lines.lock().push("Sensors refreshed".to_string());
        Ok(())
    }
}

pub struct Console<W: Write> {
    service: SharedSecurityService,
    display: Arc<DisplayListener>,
    out: W,
    frame_size: (u32, u32),
}

impl<W: Write> Console<W> {
    /// Attach a console to the service. The display listener stays registered
    /// until [`Console::detach`].
    pub fn new(service: SharedSecurityService, out: W) -> Self {
        let display = Arc::new(DisplayListener::new());
        service.lock().add_status_listener(display.clone());
        Self {
            service,
            display,
            out,
            frame_size: (640, 480),
        }
    }

    /// Size of frames produced by `scan blank`.
    pub fn with_frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = (width, height);
        self
    }

    /// Read commands until end of input or `quit`.
    pub fn run(&mut self, input: impl BufRead) -> Result<()> {
        writeln!(self.out, "Very Secure App - type 'help' for commands")?;
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            debug!("[Console] {}", line);

            let keep_going = match line.parse::<Command>() {
                Ok(command) => self.execute(command)?,
                Err(e) => {
                    writeln!(self.out, "error: {}", e)?;
                    true
                }
            };
            self.flush_display()?;
            if !keep_going {
                break;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    /// Apply one command. Returns false when the console should stop.
    pub fn execute(&mut self, command: Command) -> Result<bool> {
        match command {
            Command::Status => self.print_status()?,
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Quit => return Ok(false),
            Command::Arm(status) => {
                self.service.lock().set_arming_status(status);
                writeln!(self.out, "Arming: {}", status.description())?;
            }
            Command::AddSensor { name, sensor_type } => {
                let mut service = self.service.lock();
                if service.find_sensor_by_name(&name).is_some() {
                    writeln!(self.out, "Sensor '{}' already exists", name)?;
                } else {
                    service.add_sensor(Sensor::new(name.clone(), sensor_type));
                    writeln!(self.out, "Added {} sensor '{}'", sensor_type, name)?;
                }
            }
            Command::RemoveSensor { name } => {
                let mut service = self.service.lock();
                match service.find_sensor_by_name(&name) {
                    Some(sensor) => {
                        service.remove_sensor(&sensor);
                        writeln!(self.out, "Removed sensor '{}'", sensor.name())?;
                    }
                    None => writeln!(self.out, "No sensor named '{}'", name)?,
                }
            }
            Command::SetSensorActive { name, active } => {
                let mut service = self.service.lock();
                match service.find_sensor_by_name(&name) {
                    Some(sensor) => {
                        service.change_sensor_activation_status(&sensor, active);
                        writeln!(
                            self.out,
                            "Sensor '{}' is now {}",
                            sensor.name(),
                            if active { "Active" } else { "Inactive" }
                        )?;
                    }
                    None => {
                        let e = SecurityError::UnknownSensor(name);
                        writeln!(self.out, "error: {}", e)?;
                    }
                }
            }
            Command::Scan(source) => {
                let frame = match &source {
                    FrameSource::Blank => Ok(blank_frame(self.frame_size.0, self.frame_size.1)),
                    FrameSource::File(path) => load_image(path),
                };
                match frame {
                    Ok(frame) => self.service.lock().process_image(&frame),
                    Err(e) => {
                        warn!("[Console] Could not load frame {:?}: {}", source, e);
                        writeln!(self.out, "error: {}", e)?;
                    }
                }
            }
        }
        Ok(true)
    }

    fn print_status(&mut self) -> Result<()> {
        let (alarm, arming, sensors) = {
            let service = self.service.lock();
            (service.alarm_status(), service.arming_status(), service.sensors())
        };
        writeln!(self.out, "System Status: {} ({})", alarm.description(), alarm)?;
        writeln!(self.out, "Arming: {}", arming.description())?;
        if sensors.is_empty() {
            writeln!(self.out, "No sensors")?;
        }
        for sensor in sensors {
            writeln!(
                self.out,
                "  {:<20} {:<7} {}",
                sensor.name(),
                sensor.sensor_type(),
                if sensor.is_active() { "Active" } else { "Inactive" }
            )?;
        }
        Ok(())
    }

    fn flush_display(&mut self) -> Result<()> {
        for line in self.display.drain() {
            writeln!(self.out, "  > {}", line)?;
        }
        Ok(())
    }

    /// Unregister the display listener and hand back the writer.
    pub fn detach(self) -> W {
        let listener: Arc<dyn StatusListener> = self.display;
        self.service.lock().remove_status_listener(&listener);
        self.out
    }
}

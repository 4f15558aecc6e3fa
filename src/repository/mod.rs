//! Storage for sensors and panel state.
//!
//! The security service treats a [`SecurityRepository`] as the only source of
//! truth for the current alarm status, arming status and sensor set. It reads
//! on every operation and never caches these values between calls.
//!
//! Implementations:
//! - [`InMemoryRepository`]: process-local state
//! - [`JsonFileRepository`]: in-memory state mirrored to a JSON snapshot file

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileRepository;
pub use memory::InMemoryRepository;

use crate::sensors::Sensor;
use crate::status::{AlarmStatus, ArmingStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Store for the panel's sensors and current statuses.
///
/// There are no error conditions at this layer. Removing or updating a sensor
/// that was never added is a no-op.
pub trait SecurityRepository: Send + Sync {
    fn alarm_status(&self) -> AlarmStatus;

    fn set_alarm_status(&self, status: AlarmStatus);

    fn arming_status(&self) -> ArmingStatus;

    fn set_arming_status(&self, status: ArmingStatus);

    /// Snapshot of all sensors, ordered by name.
    fn sensors(&self) -> BTreeSet<Sensor>;

    /// Add a sensor. An existing sensor with the same identity is kept.
    fn add_sensor(&self, sensor: Sensor);

    fn remove_sensor(&self, sensor: &Sensor);

    /// Replace the stored copy of a sensor with the given value.
    fn update_sensor(&self, sensor: &Sensor);

    /// Stored copy of a sensor with the same identity, if any.
    fn find_sensor(&self, sensor: &Sensor) -> Option<Sensor> {
        self.sensors().get(sensor).cloned()
    }
}

/// Complete repository contents.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RepositoryState {
    pub alarm_status: AlarmStatus,
    pub arming_status: ArmingStatus,
    pub sensors: BTreeSet<Sensor>,
}

impl RepositoryState {
    /// Apply an update to a known sensor. Returns false when the sensor is absent.
    pub fn update_sensor(&mut self, sensor: &Sensor) -> bool {
        if self.sensors.remove(sensor) {
            self.sensors.insert(sensor.clone());
            true
        } else {
            false
        }
    }
}

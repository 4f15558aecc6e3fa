//! Process-local repository.
//!
//! State sits behind a `parking_lot::RwLock` so the repository can be read
//! from several threads while the security service writes to it.

use super::{RepositoryState, SecurityRepository};
use crate::sensors::Sensor;
use crate::status::{AlarmStatus, ArmingStatus};
use parking_lot::RwLock;
use std::collections::BTreeSet;

/// Repository holding everything in memory. Starts disarmed with no alarm
/// and no sensors.
#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<RepositoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing state, e.g. a test fixture.
    pub fn with_state(state: RepositoryState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }
}

impl SecurityRepository for InMemoryRepository {
    fn alarm_status(&self) -> AlarmStatus {
        self.state.read().alarm_status
    }

    fn set_alarm_status(&self, status: AlarmStatus) {
        self.state.write().alarm_status = status;
    }

    fn arming_status(&self) -> ArmingStatus {
        self.state.read().arming_status
    }

    fn set_arming_status(&self, status: ArmingStatus) {
        self.state.write().arming_status = status;
    }

    fn sensors(&self) -> BTreeSet<Sensor> {
        self.state.read().sensors.clone()
    }

    fn add_sensor(&self, sensor: Sensor) {
        self.state.write().sensors.insert(sensor);
    }

    fn remove_sensor(&self, sensor: &Sensor) {
        self.state.write().sensors.remove(sensor);
    }

    fn update_sensor(&self, sensor: &Sensor) {
        if !self.state.write().update_sensor(sensor) {
            log::debug!("Ignoring update for unknown sensor {}", sensor.name());
        }
    }

    fn find_sensor(&self, sensor: &Sensor) -> Option<Sensor> {
        self.state.read().sensors.get(sensor).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::SensorType;

    #[test]
    fn test_defaults() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.alarm_status(), AlarmStatus::NoAlarm);
        assert_eq!(repo.arming_status(), ArmingStatus::Disarmed);
        assert!(repo.sensors().is_empty());
    }

    #[test]
    fn test_status_round_trip() {
        let repo = InMemoryRepository::new();
        repo.set_alarm_status(AlarmStatus::Alarm);
        repo.set_arming_status(ArmingStatus::ArmedAway);
        assert_eq!(repo.alarm_status(), AlarmStatus::Alarm);
        assert_eq!(repo.arming_status(), ArmingStatus::ArmedAway);
    }

    #[test]
    fn test_add_is_idempotent() {
        let repo = InMemoryRepository::new();
        repo.add_sensor(Sensor::new("Door", SensorType::Door));
        repo.add_sensor(Sensor::new("Door", SensorType::Door).with_active(true));
        let sensors = repo.sensors();
        assert_eq!(sensors.len(), 1);
        // First insert wins
        assert!(!sensors.iter().next().unwrap().is_active());
    }

    #[test]
    fn test_update_replaces_stored_copy() {
        let repo = InMemoryRepository::new();
        let sensor = Sensor::new("Window", SensorType::Window);
        repo.add_sensor(sensor.clone());

        repo.update_sensor(&sensor.clone().with_active(true));
        assert!(repo.find_sensor(&sensor).unwrap().is_active());
    }

    #[test]
    fn test_absent_sensor_is_noop() {
        let repo = InMemoryRepository::new();
        let ghost = Sensor::new("Ghost", SensorType::Motion);

        repo.remove_sensor(&ghost);
        repo.update_sensor(&ghost.clone().with_active(true));

        assert!(repo.sensors().is_empty());
        assert!(repo.find_sensor(&ghost).is_none());
    }
}

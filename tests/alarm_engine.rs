//! End-to-end behaviour of the security service through its public API.

use catpoint_security::classifier::{ImageClassifier, blank_frame};
use catpoint_security::error::SecurityError;
use catpoint_security::repository::{InMemoryRepository, RepositoryState, SecurityRepository};
use catpoint_security::{
    AlarmStatus, ArmingStatus, Result, SecurityService, Sensor, SensorType, StatusListener,
};
use image::DynamicImage;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
struct ScriptedClassifier {
    cat: AtomicBool,
}

impl ScriptedClassifier {
    fn set(&self, cat: bool) {
        self.cat.store(cat, Ordering::SeqCst);
    }
}

impl ImageClassifier for ScriptedClassifier {
    fn image_contains_cat(&self, _image: &DynamicImage, _threshold: f32) -> bool {
        self.cat.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Alarm(AlarmStatus),
    Cat(bool),
    SensorsChanged,
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl Recorder {
    fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl StatusListener for Recorder {
    fn notify(&self, status: AlarmStatus) -> Result<()> {
        self.events.lock().push(Event::Alarm(status));
        Ok(())
    }

    fn cat_detected(&self, cat: bool) -> Result<()> {
        self.events.lock().push(Event::Cat(cat));
        Ok(())
    }

    fn sensor_status_changed(&self) -> Result<()> {
        self.events.lock().push(Event::SensorsChanged);
        Ok(())
    }
}

struct Broken;

impl StatusListener for Broken {
    fn notify(&self, _status: AlarmStatus) -> Result<()> {
        Err(SecurityError::ListenerFailed("screen unplugged".into()))
    }

    fn cat_detected(&self, _cat: bool) -> Result<()> {
        Err(SecurityError::ListenerFailed("screen unplugged".into()))
    }
}

struct Panel {
    service: SecurityService,
    repository: Arc<InMemoryRepository>,
    classifier: Arc<ScriptedClassifier>,
    recorder: Arc<Recorder>,
}

fn panel(arming: ArmingStatus, alarm: AlarmStatus, sensors: Vec<Sensor>) -> Panel {
    let repository = Arc::new(InMemoryRepository::with_state(RepositoryState {
        alarm_status: alarm,
        arming_status: arming,
        sensors: sensors.into_iter().collect(),
    }));
    let classifier = Arc::new(ScriptedClassifier::default());
    let recorder = Arc::new(Recorder::default());
    let mut service = SecurityService::new(repository.clone(), classifier.clone());
    service.add_status_listener(recorder.clone());
    Panel {
        service,
        repository,
        classifier,
        recorder,
    }
}

fn all_sensors() -> Vec<Sensor> {
    vec![
        Sensor::new("Door", SensorType::Door),
        Sensor::new("Window", SensorType::Window),
        Sensor::new("Motion", SensorType::Motion),
    ]
}

#[test]
fn activation_escalates_for_every_sensor_type() {
    for sensor in all_sensors() {
        for arming in [ArmingStatus::ArmedHome, ArmingStatus::ArmedAway] {
            for (start, expected) in [
                (AlarmStatus::NoAlarm, AlarmStatus::PendingAlarm),
                (AlarmStatus::PendingAlarm, AlarmStatus::Alarm),
                (AlarmStatus::Alarm, AlarmStatus::Alarm),
            ] {
                let mut p = panel(arming, start, vec![sensor.clone()]);
                p.service.change_sensor_activation_status(&sensor, true);
                assert_eq!(
                    p.repository.alarm_status(),
                    expected,
                    "{} activated at {start} while {arming}",
                    sensor.name()
                );
            }
        }
    }
}

#[test]
fn deactivation_of_active_sensor_deescalates() {
    for sensor in all_sensors() {
        let active = sensor.clone().with_active(true);
        for (start, expected) in [
            (AlarmStatus::PendingAlarm, AlarmStatus::NoAlarm),
            (AlarmStatus::Alarm, AlarmStatus::PendingAlarm),
            (AlarmStatus::NoAlarm, AlarmStatus::NoAlarm),
        ] {
            let mut p = panel(ArmingStatus::ArmedAway, start, vec![active.clone()]);
            p.service.change_sensor_activation_status(&active, false);
            assert_eq!(p.repository.alarm_status(), expected);
            assert!(!p.repository.find_sensor(&sensor).unwrap().is_active());
        }
    }
}

#[test]
fn deactivating_inactive_sensor_never_changes_alarm() {
    for arming in [
        ArmingStatus::Disarmed,
        ArmingStatus::ArmedHome,
        ArmingStatus::ArmedAway,
    ] {
        for start in [
            AlarmStatus::NoAlarm,
            AlarmStatus::PendingAlarm,
            AlarmStatus::Alarm,
        ] {
            let sensor = Sensor::new("Door", SensorType::Door);
            let mut p = panel(arming, start, vec![sensor.clone()]);
            p.service.change_sensor_activation_status(&sensor, false);
            assert_eq!(p.repository.alarm_status(), start);
            assert!(p.recorder.take().is_empty());
        }
    }
}

#[test]
fn disarmed_activation_records_sensor_only() {
    let sensor = Sensor::new("Door", SensorType::Door);
    let mut p = panel(ArmingStatus::Disarmed, AlarmStatus::NoAlarm, vec![sensor.clone()]);

    p.service.change_sensor_activation_status(&sensor, true);

    assert_eq!(p.repository.alarm_status(), AlarmStatus::NoAlarm);
    assert!(p.repository.find_sensor(&sensor).unwrap().is_active());
    assert!(p.recorder.take().is_empty());
}

#[test]
fn disarming_always_clears_alarm() {
    for start in [
        AlarmStatus::NoAlarm,
        AlarmStatus::PendingAlarm,
        AlarmStatus::Alarm,
    ] {
        let mut p = panel(ArmingStatus::ArmedHome, start, all_sensors());
        p.service.set_arming_status(ArmingStatus::Disarmed);
        assert_eq!(p.repository.alarm_status(), AlarmStatus::NoAlarm);
        assert_eq!(
            p.recorder.take(),
            vec![Event::Alarm(AlarmStatus::NoAlarm), Event::SensorsChanged]
        );
    }
}

#[test]
fn arming_home_after_cat_forces_alarm() {
    let mut p = panel(ArmingStatus::Disarmed, AlarmStatus::NoAlarm, vec![]);
    p.classifier.set(true);
    p.service.process_image(&blank_frame(8, 8));
    // Not armed at home yet, so no alarm from the frame itself.
    assert_eq!(p.repository.alarm_status(), AlarmStatus::NoAlarm);

    p.service.set_arming_status(ArmingStatus::ArmedHome);
    assert_eq!(p.repository.alarm_status(), AlarmStatus::Alarm);
    assert_eq!(p.repository.arming_status(), ArmingStatus::ArmedHome);
}

#[test]
fn arming_home_after_cat_keeps_active_sensors() {
    let sensors: Vec<Sensor> = all_sensors()
        .into_iter()
        .map(|s| s.with_active(true))
        .collect();
    let mut p = panel(ArmingStatus::ArmedAway, AlarmStatus::Alarm, sensors);
    p.classifier.set(true);
    p.service.process_image(&blank_frame(8, 8));

    p.service.set_arming_status(ArmingStatus::ArmedHome);

    // The cat override replaces the reset branch: no de-escalation happens.
    assert_eq!(p.repository.alarm_status(), AlarmStatus::Alarm);
    assert!(p.repository.sensors().iter().all(Sensor::is_active));
}

#[test]
fn arming_resets_every_sensor() {
    for arming in [ArmingStatus::ArmedHome, ArmingStatus::ArmedAway] {
        let sensors: Vec<Sensor> = all_sensors()
            .into_iter()
            .map(|s| s.with_active(true))
            .collect();
        let mut p = panel(ArmingStatus::Disarmed, AlarmStatus::NoAlarm, sensors);

        p.service.set_arming_status(arming);

        assert!(p.repository.sensors().iter().all(|s| !s.is_active()));
        assert_eq!(p.repository.arming_status(), arming);
        assert_eq!(p.recorder.take().last(), Some(&Event::SensorsChanged));
    }
}

#[test]
fn rearming_away_with_three_active_sensors() {
    let sensors: Vec<Sensor> = all_sensors()
        .into_iter()
        .map(|s| s.with_active(true))
        .collect();
    let mut p = panel(ArmingStatus::ArmedAway, AlarmStatus::PendingAlarm, sensors);

    p.service.set_arming_status(ArmingStatus::ArmedAway);

    let stored = p.repository.sensors();
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|s| !s.is_active()));
    // First reset de-escalates Pending -> NoAlarm; the rest find NoAlarm.
    assert_eq!(p.repository.alarm_status(), AlarmStatus::NoAlarm);
}

#[test]
fn door_scenario_escalates_twice() {
    let door = Sensor::new("DoorA", SensorType::Door);
    let mut p = panel(ArmingStatus::ArmedHome, AlarmStatus::NoAlarm, vec![door.clone()]);

    p.service.change_sensor_activation_status(&door, true);
    assert_eq!(p.repository.alarm_status(), AlarmStatus::PendingAlarm);

    p.service.change_sensor_activation_status(&door, true);
    assert_eq!(p.repository.alarm_status(), AlarmStatus::Alarm);

    assert_eq!(
        p.recorder.take(),
        vec![
            Event::Alarm(AlarmStatus::PendingAlarm),
            Event::Alarm(AlarmStatus::Alarm)
        ]
    );
}

#[test]
fn image_verdicts() {
    // Cat while armed at home
    let mut p = panel(ArmingStatus::ArmedHome, AlarmStatus::NoAlarm, all_sensors());
    p.classifier.set(true);
    p.service.process_image(&blank_frame(8, 8));
    assert_eq!(p.repository.alarm_status(), AlarmStatus::Alarm);
    assert_eq!(
        p.recorder.take(),
        vec![Event::Alarm(AlarmStatus::Alarm), Event::Cat(true)]
    );

    // No cat, one sensor active: unchanged
    let mut sensors = all_sensors();
    sensors[0] = sensors[0].clone().with_active(true);
    let mut p = panel(ArmingStatus::ArmedHome, AlarmStatus::PendingAlarm, sensors);
    p.service.process_image(&blank_frame(8, 8));
    assert_eq!(p.repository.alarm_status(), AlarmStatus::PendingAlarm);
    assert_eq!(
        p.recorder.take(),
        vec![Event::Alarm(AlarmStatus::PendingAlarm), Event::Cat(false)]
    );

    // No cat, all sensors quiet: cleared
    let mut p = panel(ArmingStatus::ArmedAway, AlarmStatus::Alarm, all_sensors());
    p.service.process_image(&blank_frame(8, 8));
    assert_eq!(p.repository.alarm_status(), AlarmStatus::NoAlarm);
}

#[test]
fn cat_flag_persists_across_arming_calls() {
    let mut p = panel(ArmingStatus::ArmedHome, AlarmStatus::NoAlarm, vec![]);
    p.classifier.set(true);
    p.service.process_image(&blank_frame(8, 8));
    assert_eq!(p.repository.alarm_status(), AlarmStatus::Alarm);

    p.service.set_arming_status(ArmingStatus::ArmedHome);
    assert_eq!(p.repository.alarm_status(), AlarmStatus::Alarm);

    // A clear frame drops the flag again.
    p.classifier.set(false);
    p.service.process_image(&blank_frame(8, 8));
    p.service.set_arming_status(ArmingStatus::ArmedHome);
    assert_eq!(p.repository.alarm_status(), AlarmStatus::NoAlarm);
}

#[test]
fn failing_listener_is_isolated() {
    let mut p = panel(ArmingStatus::ArmedHome, AlarmStatus::NoAlarm, vec![]);
    let recorder: Arc<dyn StatusListener> = p.recorder.clone();
    let broken: Arc<dyn StatusListener> = Arc::new(Broken);
    // Put the broken listener first in line.
    p.service.remove_status_listener(&recorder);
    p.service.add_status_listener(broken.clone());
    p.service.add_status_listener(recorder);

    p.classifier.set(true);
    p.service.process_image(&blank_frame(8, 8));

    assert_eq!(
        p.recorder.take(),
        vec![Event::Alarm(AlarmStatus::Alarm), Event::Cat(true)]
    );
    p.service.remove_status_listener(&broken);
}

#[test]
fn listeners_have_set_semantics() {
    let mut p = panel(ArmingStatus::ArmedAway, AlarmStatus::NoAlarm, vec![]);
    let recorder: Arc<dyn StatusListener> = p.recorder.clone();
    p.service.add_status_listener(recorder.clone());

    p.service.set_arming_status(ArmingStatus::Disarmed);
    assert_eq!(
        p.recorder.take(),
        vec![Event::Alarm(AlarmStatus::NoAlarm), Event::SensorsChanged]
    );

    p.service.remove_status_listener(&recorder);
    p.service.remove_status_listener(&recorder);
    p.service.set_arming_status(ArmingStatus::Disarmed);
    assert!(p.recorder.take().is_empty());
}

#[test]
fn sensor_bookkeeping_tolerates_absent_sensors() {
    let mut p = panel(ArmingStatus::Disarmed, AlarmStatus::NoAlarm, vec![]);
    let ghost = Sensor::new("Ghost", SensorType::Motion);

    p.service.remove_sensor(&ghost);
    p.service.change_sensor_activation_status(&ghost, false);
    assert!(p.service.sensors().is_empty());

    p.service.add_sensor(ghost.clone());
    p.service.add_sensor(ghost.clone());
    assert_eq!(p.service.sensors().len(), 1);
    p.service.remove_sensor(&ghost);
    assert!(p.service.sensors().is_empty());
}

//! Sensor and camera simulation for testing.
//!
//! Drives the security service with fake activity: every tick one random
//! sensor flips state and one blank camera frame is classified. All calls go
//! through the shared service lock.

use crate::classifier::blank_frame;
use crate::config::SimulationConfig;
use crate::sensors::{Sensor, SensorType};
use crate::service::{SecurityService, SharedSecurityService};
use log::info;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};

/// Sensors installed by [`seed_demo_sensors`].
pub fn demo_sensors() -> Vec<Sensor> {
    vec![
        Sensor::new("Front Door", SensorType::Door),
        Sensor::new("Back Window", SensorType::Window),
        Sensor::new("Hallway", SensorType::Motion),
    ]
}

/// Add the demo sensor set if the panel has no sensors yet.
/// Returns true if sensors were added.
pub fn seed_demo_sensors(service: &mut SecurityService) -> bool {
    if !service.sensors().is_empty() {
        return false;
    }
    for sensor in demo_sensors() {
        service.add_sensor(sensor);
    }
    true
}

/// One simulation step. Returns the flipped sensor, if any.
pub fn simulation_tick(
    service: &mut SecurityService,
    rng: &mut impl Rng,
    config: &SimulationConfig,
) -> Option<Sensor> {
    let flipped = service.sensors().into_iter().choose(rng);
    if let Some(sensor) = &flipped {
        let active = !sensor.is_active();
        info!("[Sim] {} -> {}", sensor.name(), if active { "active" } else { "inactive" });
        service.change_sensor_activation_status(sensor, active);
    }

    let frame = blank_frame(config.frame_width, config.frame_height);
    service.process_image(&frame);
    flipped
}

/// Spawn a task that runs [`simulation_tick`] every `interval_ms`.
///
/// Stops after `ticks` steps, or runs until aborted when `ticks` is `None`.
pub fn run_sensor_simulation(
    service: SharedSecurityService,
    config: SimulationConfig,
    seed: Option<u64>,
    ticks: Option<u64>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut interval = interval(Duration::from_millis(config.interval_ms.max(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut completed = 0u64;
        while ticks.is_none_or(|limit| completed < limit) {
            interval.tick().await;
            let mut guard = service.lock();
            simulation_tick(&mut guard, &mut rng, &config);
            info!(
                "[Sim] Tick {}: alarm={} arming={}",
                completed + 1,
                guard.alarm_status(),
                guard.arming_status()
            );
            drop(guard);
            completed += 1;
        }
        info!("[Sim] Finished after {} ticks", completed);
    })
}

//! Simulated activity for running the panel without hardware.

pub mod sensors;

pub use sensors::{demo_sensors, run_sensor_simulation, seed_demo_sensors, simulation_tick};

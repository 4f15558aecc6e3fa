//! Input sources that drive the security service.
//!
//! - `console`: text commands from a terminal or script
//! - `simulation`: periodic fake sensor and camera activity

pub mod console;
pub mod simulation;

pub use console::Console;
pub use simulation::run_sensor_simulation;

//! Catpoint security panel library.
//!
//! Sensors report activation changes, a camera feed is checked for cats, and
//! the arming mode decides whether that activity raises the alarm. The
//! decision rules live in [`service::SecurityService`]; storage and image
//! classification sit behind the [`repository::SecurityRepository`] and
//! [`classifier::ImageClassifier`] traits.

pub mod classifier;
pub mod config;
pub mod error;
pub mod input;
pub mod instance_lock;
pub mod repository;
pub mod sensors;
pub mod service;
pub mod status;

pub use error::{Result, SecurityError};
pub use sensors::{Sensor, SensorType};
pub use service::{SecurityService, SharedSecurityService, StatusListener};
pub use status::{AlarmStatus, ArmingStatus};

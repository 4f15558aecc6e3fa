//! Sensors known to the panel.
//!
//! A [`Sensor`] is a plain value: identity is its name plus type, and the
//! `active` flag is the last state recorded through the security service.
//! Two values with the same name and type are the same sensor regardless of
//! their activation flag, so sets of sensors never hold duplicates.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use strum::{Display, EnumIter, EnumString};

/// Kind of physical sensor.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Hash,
    Ord,
    PartialOrd,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SensorType {
    Door,
    Window,
    Motion,
}

/// A door, window or motion sensor and its last recorded activation state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sensor {
    name: String,
    sensor_type: SensorType,
    #[serde(default)]
    active: bool,
}

impl Sensor {
    /// Create an inactive sensor.
    pub fn new(name: impl Into<String>, sensor_type: SensorType) -> Self {
        Self {
            name: name.into(),
            sensor_type,
            active: false,
        }
    }

    /// Builder-style activation flag, mostly for seeding repositories.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Only the security service changes activation; everything else reads it.
    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Same physical sensor, ignoring activation state.
    pub fn same_identity(&self, other: &Sensor) -> bool {
        self.name == other.name && self.sensor_type == other.sensor_type
    }
}

impl PartialEq for Sensor {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(other)
    }
}

impl Eq for Sensor {}

impl Hash for Sensor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.sensor_type.hash(state);
    }
}

impl Ord for Sensor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then(self.sensor_type.cmp(&other.sensor_type))
    }
}

impl PartialOrd for Sensor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

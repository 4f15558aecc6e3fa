//! Alarm and arming status values.
//!
//! [`AlarmStatus`] is an escalation ladder (`NoAlarm` -> `PendingAlarm` -> `Alarm`)
//! moved one rung at a time by sensor activity. [`ArmingStatus`] is the mode the
//! operator selects on the panel.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// System-observed alarm level.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum AlarmStatus {
    #[default]
    NoAlarm,
    PendingAlarm,
    Alarm,
}

impl AlarmStatus {
    /// One step up the ladder. `Alarm` stays `Alarm`.
    pub fn escalated(self) -> Self {
        match self {
            AlarmStatus::NoAlarm => AlarmStatus::PendingAlarm,
            AlarmStatus::PendingAlarm | AlarmStatus::Alarm => AlarmStatus::Alarm,
        }
    }

    /// One step down the ladder. `NoAlarm` stays `NoAlarm`.
    pub fn deescalated(self) -> Self {
        match self {
            AlarmStatus::Alarm => AlarmStatus::PendingAlarm,
            AlarmStatus::PendingAlarm | AlarmStatus::NoAlarm => AlarmStatus::NoAlarm,
        }
    }

    /// Text shown on the panel display.
    pub fn description(self) -> &'static str {
        match self {
            AlarmStatus::NoAlarm => "Cool and Good",
            AlarmStatus::PendingAlarm => "I'm in Danger...",
            AlarmStatus::Alarm => "Awooga!",
        }
    }
}

/// Operator-selected arming mode.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum ArmingStatus {
    #[default]
    #[strum(to_string = "DISARMED", serialize = "disarm", serialize = "off")]
    Disarmed,
    #[strum(to_string = "ARMED_HOME", serialize = "home")]
    ArmedHome,
    #[strum(to_string = "ARMED_AWAY", serialize = "away")]
    ArmedAway,
}

impl ArmingStatus {
    /// Text shown on the panel's arming buttons.
    pub fn description(self) -> &'static str {
        match self {
            ArmingStatus::Disarmed => "Disarmed",
            ArmingStatus::ArmedHome => "Armed - At Home",
            ArmingStatus::ArmedAway => "Armed - Away",
        }
    }
}

//! Console command parsing.

use crate::error::{Result, SecurityError};
use crate::sensors::SensorType;
use crate::status::ArmingStatus;
use std::path::PathBuf;
use std::str::FromStr;

/// Where a scanned camera frame comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameSource {
    Blank,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Status,
    Arm(ArmingStatus),
    AddSensor { name: String, sensor_type: SensorType },
    RemoveSensor { name: String },
    SetSensorActive { name: String, active: bool },
    Scan(FrameSource),
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  status                                   show alarm, arming and sensors
  arm <disarmed|home|away>                 change arming status
  sensor add <name> <door|window|motion>   add an inactive sensor
  sensor remove <name>                     remove a sensor
  sensor activate <name>                   mark a sensor active
  sensor deactivate <name>                 mark a sensor inactive
  scan <path|blank>                        classify a camera frame
  help                                     show this text
  quit                                     leave the console";

impl FromStr for Command {
    type Err = SecurityError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(SecurityError::UnknownCommand(String::new()));
        };
        let rest: Vec<&str> = words.collect();

        match verb.to_ascii_lowercase().as_str() {
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            "arm" => match rest.as_slice() {
                [mode] => ArmingStatus::from_str(mode)
                    .map(Command::Arm)
                    .map_err(|_| SecurityError::InvalidArguments(format!("unknown mode '{mode}'"))),
                _ => Err(SecurityError::InvalidArguments(
                    "usage: arm <disarmed|home|away>".into(),
                )),
            },
            "scan" => match rest.as_slice() {
                [] => Err(SecurityError::InvalidArguments(
                    "usage: scan <path|blank>".into(),
                )),
                [word] if word.eq_ignore_ascii_case("blank") => Ok(Command::Scan(FrameSource::Blank)),
                parts => Ok(Command::Scan(FrameSource::File(PathBuf::from(parts.join(" "))))),
            },
            "sensor" => parse_sensor(&rest),
            other => Err(SecurityError::UnknownCommand(other.to_string())),
        }
    }
}

fn parse_sensor(args: &[&str]) -> Result<Command> {
    let Some((action, rest)) = args.split_first() else {
        return Err(SecurityError::InvalidArguments(
            "usage: sensor <add|remove|activate|deactivate> ...".into(),
        ));
    };
    let name = rest.join(" ");

    match action.to_ascii_lowercase().as_str() {
        "add" => {
            let Some((kind, name_parts)) = rest.split_last() else {
                return Err(SecurityError::InvalidArguments(
                    "usage: sensor add <name> <door|window|motion>".into(),
                ));
            };
            if name_parts.is_empty() {
                return Err(SecurityError::InvalidArguments("sensor name is empty".into()));
            }
            let sensor_type = SensorType::from_str(kind).map_err(|_| {
                SecurityError::InvalidArguments(format!("unknown sensor type '{kind}'"))
            })?;
            Ok(Command::AddSensor {
                name: name_parts.join(" "),
                sensor_type,
            })
        }
        _ if name.is_empty() => Err(SecurityError::InvalidArguments(format!(
            "usage: sensor {action} <name>"
        ))),
        "remove" => Ok(Command::RemoveSensor { name }),
        "activate" | "on" => Ok(Command::SetSensorActive { name, active: true }),
        "deactivate" | "off" => Ok(Command::SetSensorActive {
            name,
            active: false,
        }),
        other => Err(SecurityError::UnknownCommand(format!("sensor {other}"))),
    }
}

//! Repository mirrored to a JSON snapshot file.
//!
//! All reads are served from memory. Every write rewrites the whole snapshot
//! so the panel comes back in the same state after a restart. Save failures
//! are logged and otherwise ignored; the repository contract has no error
//! conditions, so the in-memory state stays authoritative.

use super::{RepositoryState, SecurityRepository};
use crate::error::{Result, SecurityError};
use crate::sensors::Sensor;
use crate::status::{AlarmStatus, ArmingStatus};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk layout of the snapshot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(flatten)]
    pub state: RepositoryState,
    pub saved_at: DateTime<Utc>,
}

impl PersistedState {
    /// Load from file. A missing file yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        match fs::read(path) {
            Ok(bytes) => serde_json::from_slice::<PersistedState>(&bytes)
                .map(Some)
                .map_err(|e| SecurityError::RepositoryLoadFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SecurityError::RepositoryLoadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Save to file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}

/// Repository persisted as a JSON document.
pub struct JsonFileRepository {
    path: PathBuf,
    state: RwLock<RepositoryState>,
}

impl JsonFileRepository {
    /// Open the repository at `path`, starting fresh if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = match PersistedState::load(&path)? {
            Some(persisted) => {
                info!(
                    "Loaded {} sensors from {:?} (saved {})",
                    persisted.state.sensors.len(),
                    path,
                    persisted.saved_at
                );
                persisted.state
            }
            None => {
                info!("No repository file at {:?}, starting fresh", path);
                RepositoryState::default()
            }
        };
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Default location under the user's data directory.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("catpoint")
            .join("security.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modify(&self, change: impl FnOnce(&mut RepositoryState)) {
        let mut state = self.state.write();
        change(&mut state);
        let persisted = PersistedState {
            state: state.clone(),
            saved_at: Utc::now(),
        };
        match persisted.save(&self.path) {
            Ok(()) => debug!("Saved repository to {:?}", self.path),
            Err(e) => error!("Failed to save repository to {:?}: {}", self.path, e),
        }
    }
}

impl SecurityRepository for JsonFileRepository {
    fn alarm_status(&self) -> AlarmStatus {
        self.state.read().alarm_status
    }

    fn set_alarm_status(&self, status: AlarmStatus) {
        self.modify(|state| state.alarm_status = status);
    }

    fn arming_status(&self) -> ArmingStatus {
        self.state.read().arming_status
    }

    fn set_arming_status(&self, status: ArmingStatus) {
        self.modify(|state| state.arming_status = status);
    }

    fn sensors(&self) -> BTreeSet<Sensor> {
        self.state.read().sensors.clone()
    }

    fn add_sensor(&self, sensor: Sensor) {
        self.modify(|state| {
            state.sensors.insert(sensor);
        });
    }

    fn remove_sensor(&self, sensor: &Sensor) {
        self.modify(|state| {
            state.sensors.remove(sensor);
        });
    }

    fn update_sensor(&self, sensor: &Sensor) {
        self.modify(|state| {
            state.update_sensor(sensor);
        });
    }

    fn find_sensor(&self, sensor: &Sensor) -> Option<Sensor> {
        self.state.read().sensors.get(sensor).cloned()
    }
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Load environment variables from a .env file.
/// Values may contain spaces without quotes; existing variables win.
pub fn load_dotenv() {
    load_dotenv_from(Path::new(".env"));
}

pub fn load_dotenv_from(env_path: &Path) {
    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for (key, value) in parse_dotenv(&content) {
        if std::env::var(key).is_err() {
            // SAFETY: called at startup before any other thread exists
            unsafe { std::env::set_var(key, value) };
        }
    }
}

/// Parse `KEY=value` lines, skipping blanks and `#` comments.
fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let mut value = line[eq_pos + 1..].trim();

            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }
            if !key.is_empty() {
                pairs.push((key, value));
            }
        }
    }
    pairs
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub panel: PanelConfig,
    pub repository: RepositoryConfig,
    pub camera: CameraConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Used for the instance lock and log prefixes.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// JSON snapshot file; `None` keeps everything in memory.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Chance that the fake classifier reports a cat.
    pub cat_probability: f64,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub interval_ms: u64,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            panel: PanelConfig {
                name: "catpoint".to_string(),
            },
            repository: RepositoryConfig { path: None },
            camera: CameraConfig {
                cat_probability: 0.5,
                seed: None,
            },
            simulation: SimulationConfig {
                interval_ms: 2000,
                frame_width: 640,
                frame_height: 480,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unparseable values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(name) = lookup("CATPOINT_PANEL_NAME") {
            config.panel.name = name;
        }

        if let Some(repository) = lookup("CATPOINT_REPOSITORY") {
            config.repository.path = match repository.trim() {
                "" | "memory" => None,
                path => Some(PathBuf::from(path)),
            };
        }

        if let Some(probability) = lookup("CATPOINT_CAT_PROBABILITY")
            && let Ok(p) = probability.parse()
        {
            config.camera.cat_probability = p;
        }
        if let Some(seed) = lookup("CATPOINT_CLASSIFIER_SEED")
            && let Ok(s) = seed.parse()
        {
            config.camera.seed = Some(s);
        }

        if let Some(interval) = lookup("CATPOINT_SIM_INTERVAL_MS")
            && let Ok(i) = interval.parse()
        {
            config.simulation.interval_ms = i;
        }

        config
    }
}

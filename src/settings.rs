use crate::model::{ConnectionDefaults, ConnectionLog, DEFAULT_ASSIST_NODE_ADDRESS, DEFAULT_RELAY_ADDRESS};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_RINGS_ENDPOINT: &str = "http://127.0.0.1:50000";

/// Persisted preferences. Connection parameters are never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub relay_address: String,
    pub assist_node_address: String,
    pub rings_endpoint: String,
    /// 0 keeps every entry.
    pub log_capacity: usize,
    pub verify_hash: bool,
    pub log_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            relay_address: DEFAULT_RELAY_ADDRESS.to_string(),
            assist_node_address: DEFAULT_ASSIST_NODE_ADDRESS.to_string(),
            rings_endpoint: DEFAULT_RINGS_ENDPOINT.to_string(),
            log_capacity: ConnectionLog::DEFAULT_CAPACITY,
            verify_hash: false,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl Settings {
    /// ~/.dephy-interact/settings.json
    pub fn settings_file_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;
        Ok(home_dir.join(".dephy-interact").join("settings.json"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_file_path()?)
    }

    /// A missing file yields defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::settings_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| {
                    Error::Config(format!("Failed to create {}: {}", dir.display(), e))
                })?;
            }
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)
            .map_err(|e| Error::Config(format!("Failed to write {}: {}", path.display(), e)))?;

        log::info!("Saved settings to: {}", path.display());
        Ok(())
    }

    pub fn connection_defaults(&self) -> ConnectionDefaults {
        ConnectionDefaults {
            relay_address: self.relay_address.clone(),
            assist_node_address: self.assist_node_address.clone(),
        }
    }
}

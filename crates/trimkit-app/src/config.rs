//! Application configuration file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use trimkit_core::{Result, TrimError};
use trimkit_media::PlayerConfig;
use trimkit_timeline::SessionConfig;
use tracing::{debug, info};

/// Everything the binary reads from `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub player: PlayerConfig,
}

impl AppConfig {
    /// `<config dir>/trimkit/config.json`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("trimkit").join("config.json"))
    }

    pub fn from_json(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)
            .map_err(|e| TrimError::Serialization(format!("Invalid config: {}", e)))?;
        config.session.validate()?;
        Ok(config)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read(path)?;
        let config = Self::from_json(&data)?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TrimError::Serialization(format!("Failed to serialize config: {}", e)))
    }
}

//! File-backed settings.
//!
//! Every field has a default, so a missing file or a partial file both
//! yield a usable `Settings`. Environment overrides are applied later in
//! `config`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub practice: PracticeSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PracticeSettings {
    /// JSON snapshot the CLI reads rows from.
    pub snapshot_path: Option<PathBuf>,
    pub recent_limit: usize,
    pub upcoming_limit: usize,
    pub include_zero_document_types: bool,
    pub currency_symbol: String,
    pub tracker_tick_ms: u64,
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            snapshot_path: None,
            recent_limit: 5,
            upcoming_limit: 5,
            include_zero_document_types: false,
            currency_symbol: "$".to_string(),
            tracker_tick_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let settings = Self::from_toml(&raw).map_err(|reason| ConfigError::Parse {
            path: path.display().to_string(),
            reason,
        })?;
        tracing::debug!(path = %path.display(), "Loaded settings file");
        Ok(settings)
    }

    fn from_toml(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|e| e.to_string())
    }
}

//! Configuration for keytrace.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::translate::vk;

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the transcript log. Opened in append mode, so one file
    /// collects every session.
    pub log_path: PathBuf,

    /// Key that ends a capture session, by name ("F1" through "F12")
    pub stop_key: String,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keytrace");

        Self {
            log_path: data_dir.join("keylog.txt"),
            stop_key: "F12".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("keytrace")
            .join("config.json")
    }

    /// Ensure the transcript's parent directory exists.
    pub fn ensure_log_dir(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Resolve the configured stop key name to its virtual-key code.
    pub fn stop_key_code(&self) -> Result<u32, ConfigError> {
        parse_stop_key(&self.stop_key)
    }
}

/// Parse a function-key name ("F1" through "F12") to its virtual-key code.
///
/// Only function keys are accepted as stop keys; they are never part of
/// typed text, so withholding one from other applications loses nothing.
pub fn parse_stop_key(name: &str) -> Result<u32, ConfigError> {
    let number = name
        .trim()
        .strip_prefix(['F', 'f'])
        .and_then(|n| n.parse::<u32>().ok());

    match number {
        Some(n @ 1..=12) => Ok(vk::F1 + (n - 1)),
        _ => Err(ConfigError::InvalidStopKey(name.to_string())),
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid stop key {0:?} (expected F1 through F12)")]
    InvalidStopKey(String),
}

//! User configuration
//!
//! Loaded from `~/.lochat/config.toml`. Every field is optional; a missing
//! file yields defaults. `OLLAMA_BASE_URL` overrides the configured base URL.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants;
use crate::error::ConfigError;
use crate::paths;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Model server base URL (without the `/api/...` suffix)
    pub base_url: String,
    /// Model used when no snapshot has selected one yet
    pub default_model: String,
    /// Nucleus sampling sent with every request
    pub top_p: f32,
    /// Top-k sampling sent with every request
    pub top_k: u32,
    /// Override for the snapshot database location
    pub database_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: constants::ai::DEFAULT_BASE_URL.to_string(),
            default_model: constants::ai::DEFAULT_MODEL.to_string(),
            top_p: constants::ai::DEFAULT_TOP_P,
            top_k: constants::ai::DEFAULT_TOP_K,
            database_path: None,
        }
    }
}

impl AppConfig {
    /// Load from the default location and apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::load_from(&paths::config_file())?;
        Ok(config.with_base_url_override(std::env::var(constants::ai::BASE_URL_ENV).ok()))
    }

    /// Load from an explicit path; a missing file is not an error
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Replace the base URL when an override is present and non-empty
    pub fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        self
    }

    /// Resolved snapshot database path
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(paths::database_path)
    }
}

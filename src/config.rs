//! Lifecycle configuration.
//!
//! Every field has a default, so a missing config file is not an error. The
//! file lives at `<config_dir>/config.json` unless `PX2CONNECT_CONFIG` points
//! elsewhere; `PX2CONNECT_DATA_DIR` overrides where the stores are kept.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::platform;
use crate::types::errors::ConfigError;

pub const CONFIG_PATH_ENV: &str = "PX2CONNECT_CONFIG";
pub const DATA_DIR_ENV: &str = "PX2CONNECT_DATA_DIR";

/// Name of the recurring update-check alarm.
pub const UPDATE_CHECK_ALARM: &str = "update-check";

/// Longest accepted update check interval: one week.
pub const MAX_UPDATE_CHECK_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

pub const DEFAULT_RELEASE_FEED_URL: &str =
    "https://api.github.com/repos/jphermans/Px2Connect_browser_extension/releases/latest";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Host id of the running extension instance.
    pub extension_id: String,
    /// Name shared by every installation of this extension.
    pub extension_name: String,
    /// Version of the running extension.
    pub extension_version: String,
    pub release_feed_url: String,
    pub update_check_interval_minutes: u64,
    pub request_timeout_secs: u64,
    /// Skip a feed request when the last successful check is younger than this.
    /// Zero disables the cache.
    pub check_cache_ttl_secs: u64,
    pub user_agent: String,
    /// Directory for the settings and backup stores. `None` uses the platform data dir.
    pub data_dir: Option<PathBuf>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            extension_id: "px2connect".to_string(),
            extension_name: "Px2 Connect".to_string(),
            extension_version: env!("CARGO_PKG_VERSION").to_string(),
            release_feed_url: DEFAULT_RELEASE_FEED_URL.to_string(),
            update_check_interval_minutes: 6 * 60,
            request_timeout_secs: 30,
            check_cache_ttl_secs: 0,
            user_agent: format!("px2connect/{}", env!("CARGO_PKG_VERSION")),
            data_dir: None,
        }
    }
}

impl LifecycleConfig {
    /// Loads the config from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("[Config] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: LifecycleConfig = serde_json::from_str(&content).map_err(|e| {
            ConfigError::ParseError(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads from `PX2CONNECT_CONFIG` or the platform config dir, then applies
    /// the data-dir override.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| platform::get_config_dir().join("config.json"));
        let mut config = Self::load(&path)?;
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.update_check_interval_minutes == 0 {
            return Err(ConfigError::InvalidValue(
                "update_check_interval_minutes must be greater than zero".to_string(),
            ));
        }
        if self.update_check_interval_minutes > MAX_UPDATE_CHECK_INTERVAL_MINUTES {
            return Err(ConfigError::InvalidValue(format!(
                "update_check_interval_minutes cannot exceed {}",
                MAX_UPDATE_CHECK_INTERVAL_MINUTES
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.extension_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue("extension_name cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn update_check_interval(&self) -> Duration {
        Duration::from_secs(self.update_check_interval_minutes.saturating_mul(60))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn check_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.check_cache_ttl_secs)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(platform::get_data_dir)
    }
}

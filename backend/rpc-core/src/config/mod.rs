//! Client configuration.
//!
//! Stored as `client.json` in a caller-chosen directory. Missing file means
//! defaults; a present-but-corrupted file is an error. Saves are atomic
//! (temp file + rename).

use crate::error::config::ConfigError;
use crate::reconnect::DEFAULT_RECONNECT_DELAY;

use common::ErrorLocation;

use std::panic::Location;
use std::path::Path;
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use url::Url;

const CONFIG_FILE_NAME: &str = "client.json";
const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// WebSocket endpoint (`ws://` or `wss://`).
    pub address: Option<String>,
    #[serde(default)]
    pub auto_reconnect: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: None,
            auto_reconnect: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,

    /// When set, reconnect attempts use exponential backoff and give up after
    /// this much accumulated retry time. When unset, the fixed-delay policy
    /// retries forever.
    pub max_elapsed_secs: Option<u64>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_delay_secs(),
            max_elapsed_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_delay_secs() -> u64 {
    DEFAULT_RECONNECT_DELAY.as_secs()
}

impl ClientConfig {
    /// Load config from `{config_dir}/client.json`.
    ///
    /// # Returns
    ///
    /// Returns `Ok(ClientConfig)` if loaded successfully, or defaults if the
    /// file is missing.
    ///
    /// # Errors
    ///
    /// Returns `Err(ConfigError)` if the file exists but is unreadable,
    /// corrupted, or invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::Read {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: ClientConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::Parse {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to `{config_dir}/client.json` using atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if:
    /// - Validation fails
    /// - Directory creation fails
    /// - Serialization fails
    /// - Write or rename fails
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Write {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::Write {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        // Atomic rename (POSIX guarantees atomicity)
        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::Write {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(ConfigError::Validation {
                location: ErrorLocation::from(Location::caller()),
                reason: format!(
                    "Invalid version: {} (expected 1-{})",
                    self.version, CONFIG_VERSION
                ),
            });
        }

        if self.reconnect.delay_secs == 0 {
            return Err(ConfigError::Validation {
                location: ErrorLocation::from(Location::caller()),
                reason: "reconnect delay must be at least one second".to_string(),
            });
        }

        if let Some(ref address) = self.server.address {
            let url = Url::parse(address).map_err(|e| ConfigError::Validation {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Invalid address {:?}: {}", address, e),
            })?;

            if url.scheme() != "ws" && url.scheme() != "wss" {
                return Err(ConfigError::Validation {
                    location: ErrorLocation::from(Location::caller()),
                    reason: format!(
                        "Invalid address scheme {:?} (expected ws or wss)",
                        url.scheme()
                    ),
                });
            }
        }

        Ok(())
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect.delay_secs)
    }

    pub fn max_elapsed(&self) -> Option<Duration> {
        self.reconnect.max_elapsed_secs.map(Duration::from_secs)
    }
}

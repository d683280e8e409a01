//! Page-wide settings

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::network::NetworkTable;
use crate::{AUTO_INVOKE_INTERVAL_MS, CURRENT_USER_TOKEN};

/// Logging section of the settings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (text, compact, json)
    pub format: String,
    /// Enable ANSI colors
    pub color: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            color: true,
        }
    }
}

/// Settings shared by every mounted widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Period of automatic read invocations, in milliseconds.
    pub auto_invoke_interval_ms: u64,
    /// Element value substituted by the active wallet address.
    pub current_user_token: String,
    /// Chain id → network name, defaults merged with file entries.
    pub networks: NetworkTable,
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_invoke_interval_ms: AUTO_INVOKE_INTERVAL_MS,
            current_user_token: CURRENT_USER_TOKEN.to_string(),
            networks: NetworkTable::default(),
            logging: LoggingSettings::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SettingsFile {
    auto_invoke_interval_ms: u64,
    current_user_token: String,
    networks: NetworkTable,
    logging: LoggingSettings,
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            auto_invoke_interval_ms: AUTO_INVOKE_INTERVAL_MS,
            current_user_token: CURRENT_USER_TOKEN.to_string(),
            networks: NetworkTable::empty(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Settings {
    /// Parses settings from TOML; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let file: SettingsFile = toml::from_str(content)?;

        let mut networks = NetworkTable::default();
        networks.merge(&file.networks);

        let settings = Self {
            auto_invoke_interval_ms: file.auto_invoke_interval_ms,
            current_user_token: file.current_user_token,
            networks,
            logging: file.logging,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Reads and parses a settings file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.auto_invoke_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "auto_invoke_interval_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.current_user_token.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "current_user_token",
                message: "must not be empty".to_string(),
            });
        }
        let invalid = self.networks.invalid_ids();
        if !invalid.is_empty() {
            return Err(ConfigError::Invalid {
                key: "networks",
                message: format!("chain ids must be integers, got {}", invalid.join(", ")),
            });
        }
        if !matches!(self.logging.format.as_str(), "text" | "compact" | "json") {
            return Err(ConfigError::Invalid {
                key: "logging.format",
                message: format!("unknown format {}", self.logging.format),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn auto_invoke_interval(&self) -> Duration {
        Duration::from_millis(self.auto_invoke_interval_ms)
    }
}

use std::path::PathBuf;

use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid TOML for [`crate::Settings`].
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of its accepted range.
    #[error("Invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

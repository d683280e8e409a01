//! Subscriber setup for page integrations.

use std::str::FromStr;

use chainbind_config::LoggingSettings;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::{TelemetryError, TelemetryResult};

/// How the page's log output is shaped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default level for every target.
    pub level: String,
    pub format: LogFormat,
    /// ANSI colors; ignored by the JSON format.
    pub color: bool,
    /// Extra `target=level` directives, such as `chainbind::notify=warn`.
    #[serde(default)]
    pub directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(TelemetryError::UnknownFormat(other.to_string())),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            color: true,
            directives: Vec::new(),
        }
    }
}

impl TryFrom<&LoggingSettings> for LogConfig {
    type Error = TelemetryError;

    fn try_from(settings: &LoggingSettings) -> Result<Self, Self::Error> {
        Ok(Self {
            level: settings.level.clone(),
            format: settings.format.parse()?,
            color: settings.color,
            directives: Vec::new(),
        })
    }
}

impl LogConfig {
    /// Filter built from `RUST_LOG` when set, otherwise from the configured
    /// level and directives.
    fn filter(&self) -> TelemetryResult<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        let spec = std::iter::once(self.level.as_str())
            .chain(self.directives.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(",");
        EnvFilter::try_new(&spec).map_err(|e| TelemetryError::LoggingInit(e.to_string()))
    }
}

/// Installs the global subscriber. Fails when one is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    let layer = match config.format {
        LogFormat::Text => fmt::layer().with_ansi(config.color).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_ansi(config.color).boxed(),
        LogFormat::Json => fmt::layer().json().boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(config.filter()?)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(level = %config.level, format = ?config.format, "logging initialized");
    Ok(())
}

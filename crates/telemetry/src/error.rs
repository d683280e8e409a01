//! Telemetry error types

use thiserror::Error;

/// Telemetry-related errors
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Unknown log format name
    #[error("Unknown log format: {0}")]
    UnknownFormat(String),
}

/// Result type for telemetry operations
pub type TelemetryResult<T> = Result<T, TelemetryError>;

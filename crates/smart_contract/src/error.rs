//! Error types for contract model operations.

use thiserror::Error;

/// Errors raised while reading an ABI or resolving a method from it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// The requested method is not declared by the ABI.
    #[error("Method not found in ABI: {name}")]
    MethodNotFound {
        /// Method name that was looked up.
        name: String,
    },

    /// The ABI document could not be parsed.
    #[error("Invalid ABI: {message}")]
    InvalidAbi {
        /// Parser message.
        message: String,
    },
}

impl From<serde_json::Error> for AbiError {
    fn from(e: serde_json::Error) -> Self {
        AbiError::InvalidAbi {
            message: e.to_string(),
        }
    }
}

/// Result type for ABI operations
pub type AbiResult<T> = Result<T, AbiError>;

/// Errors raised by unit conversion.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// Unit name is not part of the denomination table.
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    /// Value is not a plain decimal number.
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
}

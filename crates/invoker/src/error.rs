//! Error types for widget setup.
//!
//! Invocation failures never surface as errors: they end as
//! [`InvocationStatus::Failed`](crate::InvocationStatus::Failed) or as a
//! non-completed [`InvocationOutcome`](crate::InvocationOutcome).

use chainbind_rpc_client::ChainError;
use chainbind_smart_contract::AbiError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    /// The configured method is not part of the contract ABI.
    #[error("Schema error: {0}")]
    Schema(#[from] AbiError),

    /// A required widget property is absent.
    #[error("Missing required property: {0}")]
    MissingProperty(&'static str),

    /// The contract's chain id has no known network name.
    #[error("Unknown network id: {0}")]
    UnknownNetwork(u64),

    /// The provider could not build a contract instance.
    #[error("Provider error: {0}")]
    Provider(#[from] ChainError),

    /// The shared settings failed validation.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Mounting needs a tokio runtime to run timers and invocations on.
    #[error("Not running inside a tokio runtime")]
    NoRuntime,
}

/// Result type for widget setup
pub type InvokeResult<T> = Result<T, InvokeError>;

use thiserror::Error;

/// Failure reported by a chain client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// Transport-level failure talking to the node.
    #[error("Network error: {0}")]
    Network(String),

    /// Execution reverted on chain.
    #[error("Execution reverted: {0}")]
    Reverted(String),

    /// Arguments could not be encoded for the method.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The wallet or node refused the transaction.
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    /// The provider cannot serve the requested network.
    #[error("Unsupported network: {0}")]
    UnsupportedNetwork(String),

    /// Event stream ended before the expected event.
    #[error("Transaction event stream closed")]
    StreamClosed,
}

/// Result type for chain client operations
pub type ChainResult<T> = Result<T, ChainError>;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChainResult;
use crate::tx_events::TxEventStream;

/// Sender and attached native-currency amount of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOptions {
    /// Account that signs the transaction.
    pub from: Option<String>,
    /// Amount in wei, as a decimal string.
    pub value: String,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            from: None,
            value: "0".to_string(),
        }
    }
}

/// Contract instance bound to a read-only provider.
#[async_trait]
pub trait ReadContract: Send + Sync {
    /// Calls `method` without a signature or value and returns the decoded
    /// output.
    async fn call(&self, method: &str, args: Vec<Value>) -> ChainResult<Value>;
}

/// Contract instance bound to a signer.
#[async_trait]
pub trait WriteContract: Send + Sync {
    /// Submits a transaction calling `method`.
    ///
    /// Progress is reported on the returned stream; the first event is either
    /// [`TxEvent::Submitted`](crate::TxEvent::Submitted) or
    /// [`TxEvent::Failed`](crate::TxEvent::Failed).
    async fn send(
        &self,
        method: &str,
        args: Vec<Value>,
        options: SendOptions,
    ) -> ChainResult<TxEventStream>;
}

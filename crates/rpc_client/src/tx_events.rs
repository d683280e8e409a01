//! Typed progress of a submitted transaction.
//!
//! A chain client reports everything that happens to a transaction on one
//! channel of [`TxEvent`]s instead of per-event callbacks. [`TxTracker`]
//! folds the channel into a [`TxState`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{ChainError, ChainResult};

/// Transaction progress event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TxEvent {
    /// Accepted for broadcast.
    Submitted { hash: String },
    /// Included and confirmed by `confirmations` blocks.
    Confirmed { confirmations: u64, receipt: Value },
    /// Receipt available.
    Receipt { receipt: Value },
    /// Rejected or reverted.
    Failed {
        message: String,
        receipt: Option<Value>,
    },
}

/// Producer side handed to chain client implementations.
#[derive(Debug, Clone)]
pub struct TxEventSender {
    inner: mpsc::UnboundedSender<TxEvent>,
}

impl TxEventSender {
    /// Publishes an event; returns false once the consumer is gone.
    pub fn send(&self, event: TxEvent) -> bool {
        self.inner.send(event).is_ok()
    }
}

/// Consumer side of a transaction's events.
#[derive(Debug)]
pub struct TxEventStream {
    inner: mpsc::UnboundedReceiver<TxEvent>,
}

impl TxEventStream {
    pub async fn next(&mut self) -> Option<TxEvent> {
        self.inner.recv().await
    }

    /// Waits until the transaction is accepted and returns its hash.
    ///
    /// Events preceding acceptance are skipped. Later events stay queued on
    /// the stream.
    pub async fn submitted(&mut self) -> ChainResult<String> {
        while let Some(event) = self.next().await {
            match event {
                TxEvent::Submitted { hash } => return Ok(hash),
                TxEvent::Failed { message, .. } => return Err(ChainError::Rejected(message)),
                other => debug!(?other, "event before submission"),
            }
        }
        Err(ChainError::StreamClosed)
    }
}

/// Creates a connected sender/stream pair.
pub fn tx_channel() -> (TxEventSender, TxEventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TxEventSender { inner: tx }, TxEventStream { inner: rx })
}

/// Accumulated view of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxState {
    pub transaction_hash: Option<String>,
    pub confirmations: u64,
    pub receipt: Option<Value>,
    pub error: Option<String>,
}

impl TxState {
    pub fn apply(&mut self, event: TxEvent) {
        match event {
            TxEvent::Submitted { hash } => self.transaction_hash = Some(hash),
            TxEvent::Confirmed {
                confirmations,
                receipt,
            } => {
                self.confirmations = confirmations;
                self.receipt = Some(receipt);
            }
            TxEvent::Receipt { receipt } => self.receipt = Some(receipt),
            TxEvent::Failed { message, receipt } => {
                self.error = Some(message);
                if receipt.is_some() {
                    self.receipt = receipt;
                }
            }
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Folds a transaction's events into a [`TxState`].
#[derive(Debug, Default)]
pub struct TxTracker {
    state: TxState,
}

impl TxTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a transaction whose hash is already known.
    pub fn with_hash(hash: impl Into<String>) -> Self {
        Self {
            state: TxState {
                transaction_hash: Some(hash.into()),
                ..TxState::default()
            },
        }
    }

    pub fn state(&self) -> &TxState {
        &self.state
    }

    /// Drains `stream` until the producer closes it or the transaction fails,
    /// calling `on_event` with the state after each event.
    pub async fn track<F>(mut self, mut stream: TxEventStream, mut on_event: F) -> TxState
    where
        F: FnMut(&TxEvent, &TxState) + Send,
    {
        while let Some(event) = stream.next().await {
            self.state.apply(event.clone());
            on_event(&event, &self.state);
            if self.state.is_failed() {
                warn!(
                    hash = ?self.state.transaction_hash,
                    error = ?self.state.error,
                    "transaction failed after submission"
                );
                break;
            }
        }
        self.state
    }
}

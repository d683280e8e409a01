//! Delivery of invocation results to display nodes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

use crate::status::InvocationStatus;

/// One result addressed to one display node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBroadcastEvent {
    pub target_element_id: String,
    pub payload: Value,
}

/// Outbound event channel.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, target_id: &str, payload: Value);
}

const DEFAULT_CAPACITY: usize = 256;

/// In-process event channel backed by a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastChannel {
    sender: broadcast::Sender<ResultBroadcastEvent>,
}

impl Default for BroadcastChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl BroadcastChannel {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receives the payloads addressed to `target_id` from now on.
    pub fn subscribe(&self, target_id: impl Into<String>) -> Subscription {
        Subscription {
            target_id: target_id.into(),
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventEmitter for BroadcastChannel {
    fn emit(&self, target_id: &str, payload: Value) {
        let event = ResultBroadcastEvent {
            target_element_id: target_id.to_string(),
            payload,
        };
        // No subscriber is not an error.
        if self.sender.send(event).is_err() {
            trace!(target_id, "no subscribers for result");
        }
    }
}

/// Payloads for a single display node.
#[derive(Debug)]
pub struct Subscription {
    target_id: String,
    receiver: broadcast::Receiver<ResultBroadcastEvent>,
}

impl Subscription {
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Next payload for this target; `None` once the channel is closed.
    /// Events lost to lag are skipped.
    pub async fn recv(&mut self) -> Option<Value> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.target_element_id == self.target_id => {
                    return Some(event.payload)
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(target_id = %self.target_id, skipped, "result subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv).
    pub fn try_recv(&mut self) -> Option<Value> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if event.target_element_id == self.target_id => {
                    return Some(event.payload)
                }
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

/// Emits successful results to a widget's display nodes.
#[derive(Clone)]
pub struct ResultBroadcaster {
    emitter: Arc<dyn EventEmitter>,
    targets: Vec<String>,
}

impl ResultBroadcaster {
    pub fn new(emitter: Arc<dyn EventEmitter>, targets: Vec<String>) -> Self {
        Self { emitter, targets }
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Emits `status`'s result to every target when it is `Succeeded`.
    /// Returns the number of events emitted.
    pub fn publish(&self, status: &InvocationStatus) -> usize {
        let Some(result) = status.result() else {
            return 0;
        };
        for target in &self.targets {
            self.emitter.emit(target, result.clone());
        }
        debug!(targets = self.targets.len(), "broadcast invocation result");
        self.targets.len()
    }
}

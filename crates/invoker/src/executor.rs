//! Read and write execution against the chain client.

use std::fmt;
use std::sync::Arc;

use chainbind_rpc_client::{
    ChainError, ReadContract, SendOptions, TxEvent, TxEventStream, TxTracker, WriteContract,
};
use chainbind_telemetry::Notifier;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::status::InvocationStatus;

/// User-visible message for any execution failure; details go to the log.
pub const EXECUTION_FAILED_MESSAGE: &str = "Error. Check the Console.";

/// Which chain-client path serves an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    Read,
    Write,
}

/// A fully extracted call.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    pub method: String,
    /// Positional arguments in ABI order.
    pub args: Vec<Value>,
    /// Amount of wei attached to a write; `"0"` when none.
    pub value: String,
    /// Sender of a write.
    pub from: Option<String>,
}

impl InvocationRequest {
    pub fn new(method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            args,
            value: "0".to_string(),
            from: None,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    #[must_use]
    pub fn with_from(mut self, from: Option<String>) -> Self {
        self.from = from;
        self
    }
}

/// Runs invocations on the contract instances available for one binding
/// generation.
#[derive(Clone)]
pub struct InvocationExecutor {
    read: Option<Arc<dyn ReadContract>>,
    write: Option<Arc<dyn WriteContract>>,
    signer_ready: bool,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for InvocationExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationExecutor")
            .field("read", &self.read.is_some())
            .field("write", &self.write.is_some())
            .field("signer_ready", &self.signer_ready)
            .finish()
    }
}

impl InvocationExecutor {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            read: None,
            write: None,
            signer_ready: false,
            notifier,
        }
    }

    #[must_use]
    pub fn with_read(mut self, contract: Option<Arc<dyn ReadContract>>) -> Self {
        self.read = contract;
        self
    }

    /// Sets the write instance. `signer_ready` tells whether the wallet can
    /// sign on the contract's network.
    #[must_use]
    pub fn with_write(mut self, contract: Option<Arc<dyn WriteContract>>, signer_ready: bool) -> Self {
        self.write = contract;
        self.signer_ready = signer_ready;
        self
    }

    /// The path an invocation would take, or `None` when its precondition
    /// does not hold.
    pub fn mode(&self, is_transaction: bool) -> Option<InvocationMode> {
        if is_transaction {
            (self.write.is_some() && self.signer_ready).then_some(InvocationMode::Write)
        } else {
            self.read.is_some().then_some(InvocationMode::Read)
        }
    }

    /// Runs `request` on the path selected by `mode`.
    ///
    /// Returns `None` when the instance for that path is missing. Failures
    /// are logged, notified and returned as [`InvocationStatus::Failed`].
    pub async fn invoke(
        &self,
        mode: InvocationMode,
        request: &InvocationRequest,
    ) -> Option<InvocationStatus> {
        let result = match mode {
            InvocationMode::Read => {
                let contract = self.read.as_ref()?;
                self.call(contract.as_ref(), request).await
            }
            InvocationMode::Write => {
                let contract = self.write.as_ref().filter(|_| self.signer_ready)?;
                self.send(contract.as_ref(), request).await
            }
        };

        Some(match result {
            Ok(value) => InvocationStatus::Succeeded(value),
            Err(err) => {
                error!(
                    method = %request.method,
                    ?mode,
                    error = %err,
                    "contract invocation failed"
                );
                self.notifier.notify_error(EXECUTION_FAILED_MESSAGE);
                InvocationStatus::Failed(err.to_string())
            }
        })
    }

    async fn call(
        &self,
        contract: &dyn ReadContract,
        request: &InvocationRequest,
    ) -> Result<Value, ChainError> {
        debug!(method = %request.method, args = ?request.args, "calling contract");
        contract.call(&request.method, request.args.clone()).await
    }

    async fn send(
        &self,
        contract: &dyn WriteContract,
        request: &InvocationRequest,
    ) -> Result<Value, ChainError> {
        let options = SendOptions {
            from: request.from.clone(),
            value: request.value.clone(),
        };
        debug!(
            method = %request.method,
            args = ?request.args,
            value = %options.value,
            "sending transaction"
        );

        let mut stream = contract
            .send(&request.method, request.args.clone(), options)
            .await?;
        let hash = stream.submitted().await?;
        info!(method = %request.method, %hash, "transaction submitted");

        self.track(hash.clone(), stream);
        Ok(Value::String(hash))
    }

    /// Follows the rest of a submitted transaction in the background.
    fn track(&self, hash: String, stream: TxEventStream) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            let tracker = TxTracker::with_hash(hash.clone());
            let state = tracker
                .track(stream, |event, state| match event {
                    TxEvent::Confirmed { confirmations, .. } => {
                        debug!(hash = %hash, confirmations, "transaction confirmed");
                    }
                    TxEvent::Receipt { .. } => {
                        notifier.notify_info(&format!("Transaction {hash} mined"));
                    }
                    TxEvent::Failed { message, .. } => {
                        notifier.notify_error(message);
                    }
                    TxEvent::Submitted { .. } => {
                        warn!(hash = ?state.transaction_hash, "duplicate submission event");
                    }
                })
                .await;
            debug!(
                hash = ?state.transaction_hash,
                confirmations = state.confirmations,
                failed = state.is_failed(),
                "transaction tracking finished"
            );
        });
    }
}

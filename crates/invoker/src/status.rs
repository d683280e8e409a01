use serde::{Deserialize, Serialize};
use serde_json::Value;

/// State of the most recent invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum InvocationStatus {
    #[default]
    Idle,
    Pending,
    Succeeded(Value),
    Failed(String),
}

impl InvocationStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn result(&self) -> Option<&Value> {
        match self {
            Self::Succeeded(value) => Some(value),
            _ => None,
        }
    }
}

/// What started an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvokeSource {
    /// A trigger element was activated.
    Manual,
    /// The auto-invoke timer ticked.
    Scheduled,
}

/// How an invocation request ended.
///
/// Only `Completed` changes the status; the other variants are the "did
/// nothing" paths, told apart for callers and logs.
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome {
    Completed(InvocationStatus),
    /// Another invocation is still pending.
    Busy,
    /// No contract instance can serve the method (missing, or wallet on
    /// another network).
    NotReady,
    /// Bindings were rebuilt or the widget unmounted while the call was in
    /// flight; its result was discarded.
    Stale,
    /// The widget is not mounted.
    Unmounted,
}

impl InvocationOutcome {
    pub fn status(&self) -> Option<&InvocationStatus> {
        match self {
            Self::Completed(status) => Some(status),
            _ => None,
        }
    }
}

//! # chainbind telemetry
//!
//! Logging and user-facing notifications.
//!
//! - **Logging**: `tracing` subscriber with text, compact or JSON output
//! - **Notifications**: the [`Notifier`] seam through which the orchestrator
//!   reports errors and information to the page user

mod error;
mod logging;
mod notifier;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, LogConfig, LogFormat};
pub use notifier::{
    Notification, NotificationLevel, Notifier, QueuedNotifier, TracingNotifier,
};

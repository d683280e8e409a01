//! chainbind Configuration Module
//!
//! Settings shared by every widget on a page: the auto-invoke interval, the
//! current-user placeholder, the chain id → network name table and logging
//! options.

mod error;
mod network;
mod settings;

pub use error::{ConfigError, ConfigResult};
pub use network::{NetworkTable, DEFAULT_NETWORKS};
pub use settings::{LoggingSettings, Settings};

/// Default period between two automatic invocations of a read method.
pub const AUTO_INVOKE_INTERVAL_MS: u64 = 4_000;

/// Element value replaced by the active wallet address.
pub const CURRENT_USER_TOKEN: &str = "$CURRENT_USER";

/// Element attribute naming the unit a value is displayed in.
pub const DISPLAY_UNITS_ATTRIBUTE: &str = "data-dh-modifier-display-units";

/// Element attribute naming the unit the contract expects.
pub const CONTRACT_UNITS_ATTRIBUTE: &str = "data-dh-modifier-contract-units";

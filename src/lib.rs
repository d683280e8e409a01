//! # Chainbind: smart-contract bindings for page elements
//!
//! Chainbind connects declarative page widgets to Ethereum contract methods.
//! A widget names a method of a contract ABI, the input elements feeding its
//! arguments, the trigger elements that run it and the display nodes that
//! receive its result.
//!
//! This crate re-exports the workspace members and offers [`Page`], which
//! mounts every widget of a page against one wallet session.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chainbind::prelude::*;
//!
//! # async fn run(factory: Arc<dyn ProviderFactory>, widgets: Vec<WidgetInfo>) -> chainbind::Result<()> {
//! let settings = Settings::load("chainbind.toml")?;
//! init_logging(&LogConfig::try_from(&settings.logging)?)?;
//!
//! let mut page = Page::new(factory, settings, Arc::new(TracingNotifier));
//! let mut balance = page.subscribe("balance-output");
//! for widget in &widgets {
//!     page.mount(widget)?;
//! }
//!
//! page.wallet_changed(WalletSession::connected("0xabc", 1));
//! while let Some(value) = balance.recv().await {
//!     println!("balance: {value}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`smart_contract`] - ABI model, method resolution and unit conversion
//! - [`rpc_client`] - chain client seam and transaction events
//! - [`config`] - TOML settings and the network table
//! - [`telemetry`] - logging setup and user notifications
//! - [`invoker`] - per-widget invocation orchestration

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use std::sync::Arc;

pub use chainbind_config as config;
pub use chainbind_invoker as invoker;
pub use chainbind_rpc_client as rpc_client;
pub use chainbind_smart_contract as smart_contract;
pub use chainbind_telemetry as telemetry;

use config::Settings;
use invoker::{
    BroadcastChannel, Collaborators, ContractRouter, InvokeResult, MountedWidget, Subscription,
    WidgetInfo,
};
use rpc_client::{ProviderFactory, WalletSession};
use telemetry::Notifier;
use tracing::info;

/// Common imports for page integrations
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::invoker::{
        BoundElement, ContractRouter, InvocationReducer, InvocationStatus, TriggerElement,
        WidgetInfo,
    };
    pub use crate::rpc_client::{ProviderFactory, ReadContract, WalletSession, WriteContract};
    pub use crate::telemetry::{init_logging, LogConfig, Notifier, TracingNotifier};
    pub use crate::Page;
}

/// Every mounted widget of one page, sharing a wallet session, a result
/// channel and a notifier.
pub struct Page {
    router: ContractRouter,
    channel: BroadcastChannel,
    wallet: WalletSession,
    widgets: Vec<MountedWidget>,
}

impl Page {
    /// Creates an empty page. No wallet is connected until
    /// [`wallet_changed`](Self::wallet_changed).
    pub fn new(
        factory: Arc<dyn ProviderFactory>,
        settings: Settings,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let channel = BroadcastChannel::default();
        let collaborators =
            Collaborators::new(notifier, Arc::new(channel.clone()), Arc::new(settings));
        Self {
            router: ContractRouter::new(factory, collaborators),
            channel,
            wallet: WalletSession::disconnected(),
            widgets: Vec::new(),
        }
    }

    /// Results addressed to the display node `target_id`.
    pub fn subscribe(&self, target_id: impl Into<String>) -> Subscription {
        self.channel.subscribe(target_id)
    }

    /// Mounts `widget` with the current wallet session.
    ///
    /// Must be called from within a tokio runtime.
    pub fn mount(&mut self, widget: &WidgetInfo) -> InvokeResult<&MountedWidget> {
        let mounted = self.router.mount(widget, self.wallet.clone())?;
        self.widgets.push(mounted);
        let index = self.widgets.len() - 1;
        Ok(&self.widgets[index])
    }

    /// Propagates an account or chain change to every widget.
    pub fn wallet_changed(&mut self, wallet: WalletSession) {
        info!(
            address = ?wallet.address,
            chain_id = ?wallet.chain_id,
            widgets = self.widgets.len(),
            "wallet changed"
        );
        for widget in &mut self.widgets {
            self.router.wallet_changed(widget, wallet.clone());
        }
        self.wallet = wallet;
    }

    /// Current wallet session.
    pub fn wallet(&self) -> &WalletSession {
        &self.wallet
    }

    /// Mounted widgets, in mount order.
    pub fn widgets(&self) -> &[MountedWidget] {
        &self.widgets
    }

    /// Unmounts every widget.
    pub fn unmount_all(&mut self) {
        for widget in self.widgets.drain(..) {
            widget.unmount();
        }
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        self.unmount_all();
    }
}

/// Result type for page integrations
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Chainbind library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! # Chainbind Invoker
//!
//! Binds page elements to a smart-contract method and runs it.
//!
//! A widget declares a method name, the input elements feeding its
//! arguments, the trigger elements that run it and the display nodes that
//! show its result. The [`InvocationReducer`] extracts arguments from the
//! inputs, runs the method as a read call or a transaction, optionally
//! re-runs reads on a timer and broadcasts each successful result to the
//! display nodes. [`ContractRouter`] creates the contract instances a
//! reducer needs.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use chainbind_config::Settings;
//! use chainbind_invoker::{BroadcastChannel, Collaborators, ContractRouter, WidgetInfo};
//! use chainbind_rpc_client::{ProviderFactory, WalletSession};
//! use chainbind_telemetry::TracingNotifier;
//!
//! # async fn run(factory: Arc<dyn ProviderFactory>, widget: WidgetInfo) {
//! let channel = BroadcastChannel::default();
//! let mut output = channel.subscribe("output-1");
//! let router = ContractRouter::new(
//!     factory,
//!     Collaborators::new(
//!         Arc::new(TracingNotifier),
//!         Arc::new(channel.clone()),
//!         Arc::new(Settings::default()),
//!     ),
//! );
//!
//! let mounted = router
//!     .mount(&widget, WalletSession::connected("0xabc", 1))
//!     .expect("widget is valid");
//! let result = output.recv().await;
//! # drop((mounted, result));
//! # }
//! ```

pub mod broadcaster;
pub mod error;
pub mod executor;
pub mod extractor;
pub mod memory;
pub mod page;
pub mod properties;
pub mod reducer;
pub mod router;
pub mod scheduler;
pub mod status;
pub mod trigger;

pub use broadcaster::{
    BroadcastChannel, EventEmitter, ResultBroadcastEvent, ResultBroadcaster, Subscription,
};
pub use error::{InvokeError, InvokeResult};
pub use executor::{
    InvocationExecutor, InvocationMode, InvocationRequest, EXECUTION_FAILED_MESSAGE,
};
pub use extractor::{ParameterBinding, ParameterExtractor, ParameterSet, ETH_VALUE_ARGUMENT};
pub use memory::{MemoryElement, MemoryEvent, MemoryTrigger};
pub use page::{
    BoundElement, ChildElement, ChildKind, ContractDescriptor, InputBinding, Property,
    TriggerElement, TriggerEvent, TriggerHandler, WidgetInfo,
};
pub use properties::WidgetProperties;
pub use reducer::{Collaborators, ContractHandles, InvocationReducer};
pub use router::{ContractRouter, MountedWidget};
pub use scheduler::{AutoInvokeScheduler, InvocationTarget, SchedulerState, SuspendReason};
pub use status::{InvocationOutcome, InvocationStatus, InvokeSource};
pub use trigger::TriggerBinder;

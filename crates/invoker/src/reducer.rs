//! Per-widget orchestration.
//!
//! An [`InvocationReducer`] owns everything one widget needs between mount
//! and unmount: the bound parameters, the contract instances of the current
//! binding generation, the invocation status, the trigger handlers and the
//! auto-invoke timer.
//!
//! An invocation is split in two. `begin` runs synchronously under the state
//! lock: it rejects the call when another one is pending or no instance can
//! serve it, reads the inputs and marks the status `Pending`. `complete`
//! awaits the chain client and applies the result only if the binding
//! generation it started in is still current. Rebinding (wallet or contract
//! change) and unmounting bump the generation, so late results are dropped.

use std::fmt;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use chainbind_config::Settings;
use chainbind_rpc_client::{ReadContract, WalletSession, WriteContract};
use chainbind_smart_contract::MethodDescriptor;
use chainbind_telemetry::Notifier;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

use crate::broadcaster::{EventEmitter, ResultBroadcaster};
use crate::error::{InvokeError, InvokeResult};
use crate::executor::{InvocationExecutor, InvocationMode, InvocationRequest};
use crate::extractor::{ParameterExtractor, ParameterSet};
use crate::page::{InputBinding, TriggerElement, TriggerEvent, TriggerHandler, WidgetInfo};
use crate::properties::WidgetProperties;
use crate::scheduler::{AutoInvokeScheduler, InvocationTarget, SchedulerState, SuspendReason};
use crate::status::{InvocationOutcome, InvocationStatus, InvokeSource};
use crate::trigger::TriggerBinder;

/// Services shared by every widget of a page.
#[derive(Clone)]
pub struct Collaborators {
    pub notifier: Arc<dyn Notifier>,
    pub emitter: Arc<dyn EventEmitter>,
    pub settings: Arc<Settings>,
}

impl Collaborators {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        emitter: Arc<dyn EventEmitter>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            notifier,
            emitter,
            settings,
        }
    }
}

/// Contract instances for one binding generation.
#[derive(Clone, Default)]
pub struct ContractHandles {
    pub read: Option<Arc<dyn ReadContract>>,
    pub write: Option<Arc<dyn WriteContract>>,
}

impl fmt::Debug for ContractHandles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractHandles")
            .field("read", &self.read.is_some())
            .field("write", &self.write.is_some())
            .finish()
    }
}

/// Work admitted by `begin`, finished by `complete`.
struct InvocationTicket {
    generation: u64,
    source: InvokeSource,
    mode: InvocationMode,
    request: InvocationRequest,
    executor: InvocationExecutor,
}

struct ReducerState {
    mounted: bool,
    generation: u64,
    status: InvocationStatus,
    wallet: WalletSession,
    contracts: ContractHandles,
    executor: InvocationExecutor,
    parameters: Option<ParameterSet>,
    triggers: Option<TriggerBinder>,
    auto_invoke: bool,
    runtime: Option<Handle>,
}

struct ReducerInner {
    widget_id: String,
    method: MethodDescriptor,
    properties: WidgetProperties,
    has_inputs: bool,
    network_id: u64,
    inputs: Vec<InputBinding>,
    trigger_elements: Vec<Arc<dyn TriggerElement>>,
    extractor: ParameterExtractor,
    broadcaster: ResultBroadcaster,
    notifier: Arc<dyn Notifier>,
    scheduler: AutoInvokeScheduler,
    state: Mutex<ReducerState>,
}

/// Orchestrates invocations of one widget's method.
pub struct InvocationReducer {
    inner: Arc<ReducerInner>,
}

impl InvocationReducer {
    /// Validates the widget configuration.
    ///
    /// Invalid settings, a missing `methodName` or a method absent from the
    /// ABI are reported through the notifier once and returned as an error.
    pub fn new(info: &WidgetInfo, collaborators: Collaborators) -> InvokeResult<Self> {
        let Collaborators {
            notifier,
            emitter,
            settings,
        } = collaborators;

        let configured = settings
            .validate()
            .map_err(|err| InvokeError::InvalidSettings(err.to_string()))
            .and_then(|()| WidgetProperties::parse(&info.properties))
            .and_then(|properties| {
                let method = MethodDescriptor::resolve(
                    &info.contract.abi,
                    &properties.method_name,
                    info.is_transaction,
                )?;
                Ok((properties, method))
            });
        let (properties, method) = match configured {
            Ok(configured) => configured,
            Err(err) => {
                error!(widget = %info.id, error = %err, "invalid widget configuration");
                notifier.notify_error(&err.to_string());
                return Err(err);
            }
        };

        let auto_invoke = properties.auto_invoke && !info.is_transaction;
        if properties.auto_invoke && info.is_transaction {
            warn!(widget = %info.id, method = %method.name, "auto-invoke ignored for transactions");
        }

        let state = ReducerState {
            mounted: false,
            generation: 0,
            status: InvocationStatus::Idle,
            wallet: WalletSession::disconnected(),
            contracts: ContractHandles::default(),
            executor: InvocationExecutor::new(notifier.clone()),
            parameters: None,
            triggers: None,
            auto_invoke,
            runtime: None,
        };

        Ok(Self {
            inner: Arc::new(ReducerInner {
                widget_id: info.id.clone(),
                method,
                properties,
                has_inputs: info.has_inputs,
                network_id: info.contract.network_id,
                inputs: info.input_bindings(),
                trigger_elements: info.triggers(),
                extractor: ParameterExtractor::new(settings.current_user_token.clone()),
                broadcaster: ResultBroadcaster::new(emitter, info.output_ids()),
                notifier,
                scheduler: AutoInvokeScheduler::new(settings.auto_invoke_interval()),
                state: Mutex::new(state),
            }),
        })
    }

    /// Binds parameters, installs trigger handlers and starts auto-invoke.
    ///
    /// Must be called from within a tokio runtime; invocations started by
    /// triggers run on it.
    pub fn mount(&self, wallet: WalletSession, contracts: ContractHandles) -> InvokeResult<()> {
        let runtime = Handle::try_current().map_err(|_| InvokeError::NoRuntime)?;

        let handler = self.trigger_handler(runtime.clone());
        {
            let mut state = self.inner.state.lock();
            state.mounted = true;
            state.runtime = Some(runtime);
            if state.triggers.is_none() {
                state.triggers = Some(TriggerBinder::bind(
                    self.inner.trigger_elements.clone(),
                    handler,
                ));
            }
        }
        info!(widget = %self.inner.widget_id, method = %self.inner.method.name, "widget mounted");
        self.inner.rebuild(Some(wallet), Some(contracts));
        Ok(())
    }

    /// Rebuilds the bindings after an account or chain change. `None` keeps
    /// the current contract instances.
    pub fn rebind(&self, wallet: WalletSession, contracts: Option<ContractHandles>) {
        self.inner.rebuild(Some(wallet), contracts);
    }

    /// Replaces the contract instances and rebuilds the bindings.
    pub fn set_contracts(&self, contracts: ContractHandles) {
        self.inner.rebuild(None, Some(contracts));
    }

    /// Enables or disables auto-invoke. Transactions never auto-invoke.
    pub fn set_auto_invoke(&self, enabled: bool) {
        let enabled = enabled && !self.inner.method.is_transaction;
        let mounted = {
            let mut state = self.inner.state.lock();
            state.auto_invoke = enabled;
            state.mounted
        };
        if !mounted {
            return;
        }
        if enabled {
            self.inner.arm_scheduler();
        } else {
            self.inner.scheduler.stop();
        }
    }

    /// Stops the timer, removes trigger handlers, restores the raw input
    /// values and discards in-flight results.
    pub fn unmount(&self) {
        self.inner.teardown();
    }

    /// Runs one invocation to completion.
    pub async fn invoke(&self, source: InvokeSource) -> InvocationOutcome {
        self.inner.run(source).await
    }

    pub fn widget_id(&self) -> &str {
        &self.inner.widget_id
    }

    pub fn method(&self) -> &MethodDescriptor {
        &self.inner.method
    }

    pub fn properties(&self) -> &WidgetProperties {
        &self.inner.properties
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.state.lock().mounted
    }

    pub fn status(&self) -> InvocationStatus {
        self.inner.state.lock().status.clone()
    }

    /// Result of the last successful invocation still on record.
    pub fn result(&self) -> Option<Value> {
        self.inner.state.lock().status.result().cloned()
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.inner.scheduler.state()
    }

    /// Arguments the next invocation would send, as currently bound.
    pub fn arguments(&self) -> Vec<Value> {
        let state = self.inner.state.lock();
        state
            .parameters
            .as_ref()
            .map(ParameterSet::arguments)
            .unwrap_or_default()
    }

    fn trigger_handler(&self, runtime: Handle) -> TriggerHandler {
        let inner = Arc::downgrade(&self.inner);
        Arc::new(move |event: &dyn TriggerEvent| {
            event.prevent_default();
            event.stop_propagation();

            let Some(inner) = inner.upgrade() else {
                return;
            };
            match inner.begin(InvokeSource::Manual) {
                Ok(ticket) => {
                    runtime.spawn(async move {
                        inner.complete(ticket).await;
                    });
                }
                Err(outcome) => debug!(?outcome, "manual invocation not started"),
            }
        })
    }
}

impl Drop for InvocationReducer {
    fn drop(&mut self) {
        self.inner.teardown();
    }
}

impl fmt::Debug for InvocationReducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationReducer")
            .field("widget_id", &self.inner.widget_id)
            .field("method", &self.inner.method.name)
            .finish()
    }
}

impl ReducerInner {
    fn rebuild(self: &Arc<Self>, wallet: Option<WalletSession>, contracts: Option<ContractHandles>) {
        let (auto_invoke, address_resolved) = {
            let mut state = self.state.lock();
            if !state.mounted {
                return;
            }
            if let Some(parameters) = state.parameters.take() {
                parameters.restore();
            }

            state.generation += 1;
            if state.status.is_pending() || state.status.is_failed() {
                state.status = InvocationStatus::Idle;
            }
            if let Some(wallet) = wallet {
                state.wallet = wallet;
            }
            if let Some(contracts) = contracts {
                state.contracts = contracts;
            }

            let signer_ready = state.wallet.can_sign_on(self.network_id);
            state.executor = InvocationExecutor::new(self.notifier.clone())
                .with_read(state.contracts.read.clone())
                .with_write(state.contracts.write.clone(), signer_ready);

            let parameters =
                self.extractor
                    .bind(&self.method, &self.inputs, state.wallet.address.as_deref());
            let address_resolved = !parameters.has_unresolved();
            state.parameters = Some(parameters);

            debug!(
                widget = %self.widget_id,
                generation = state.generation,
                signer_ready,
                address_resolved,
                "bindings rebuilt"
            );
            (state.auto_invoke, address_resolved)
        };

        if auto_invoke {
            self.arm(address_resolved);
        } else {
            self.scheduler.stop();
        }
    }

    fn arm_scheduler(self: &Arc<Self>) {
        let address_resolved = {
            let state = self.state.lock();
            state
                .parameters
                .as_ref()
                .map_or(true, |parameters| !parameters.has_unresolved())
        };
        self.arm(address_resolved);
    }

    fn arm(self: &Arc<Self>, address_resolved: bool) {
        let Some(runtime) = self.state.lock().runtime.clone() else {
            return;
        };
        let strong: Arc<dyn InvocationTarget> = self.clone();
        let target: Weak<dyn InvocationTarget> = Arc::downgrade(&strong);
        let _guard = runtime.enter();
        self.scheduler.arm(target, address_resolved);
    }

    fn teardown(&self) {
        let triggers = {
            let mut state = self.state.lock();
            if !state.mounted {
                return;
            }
            state.mounted = false;
            state.generation += 1;
            state.runtime = None;
            if state.status.is_pending() {
                state.status = InvocationStatus::Idle;
            }
            if let Some(parameters) = state.parameters.take() {
                parameters.restore();
            }
            state.triggers.take()
        };
        self.scheduler.stop();
        drop(triggers);
        info!(widget = %self.widget_id, "widget unmounted");
    }

    fn begin(&self, source: InvokeSource) -> Result<InvocationTicket, InvocationOutcome> {
        let mut state = self.state.lock();
        if !state.mounted {
            return Err(InvocationOutcome::Unmounted);
        }
        if state.status.is_pending() {
            debug!(widget = %self.widget_id, ?source, "invocation already pending");
            return Err(InvocationOutcome::Busy);
        }
        let Some(mode) = state.executor.mode(self.method.is_transaction) else {
            debug!(widget = %self.widget_id, ?source, "no contract instance ready");
            return Err(InvocationOutcome::NotReady);
        };

        let address = state.wallet.address.clone();
        let (args, eth_value) = match state.parameters.as_mut() {
            Some(parameters) => {
                self.extractor.refresh(parameters, address.as_deref());
                if self.has_inputs && parameters.all_empty() {
                    warn!(
                        widget = %self.widget_id,
                        method = %self.method.name,
                        "You must define your parameters first"
                    );
                }
                (parameters.arguments(), parameters.eth_value())
            }
            None => (Vec::new(), None),
        };

        let value = eth_value
            .or_else(|| self.properties.eth_value.clone())
            .unwrap_or_else(|| "0".to_string());
        let request = InvocationRequest::new(self.method.name.clone(), args)
            .with_value(value)
            .with_from(address);

        state.status = InvocationStatus::Pending;
        debug!(widget = %self.widget_id, ?source, ?mode, "invocation started");

        Ok(InvocationTicket {
            generation: state.generation,
            source,
            mode,
            request,
            executor: state.executor.clone(),
        })
    }

    async fn complete(&self, ticket: InvocationTicket) -> InvocationOutcome {
        let InvocationTicket {
            generation,
            source,
            mode,
            request,
            executor,
        } = ticket;

        let result = executor.invoke(mode, &request).await;

        let mut state = self.state.lock();
        if !state.mounted || state.generation != generation {
            debug!(
                widget = %self.widget_id,
                generation,
                current = state.generation,
                "discarding result of outdated invocation"
            );
            return InvocationOutcome::Stale;
        }

        let Some(status) = result else {
            state.status = InvocationStatus::Idle;
            return InvocationOutcome::NotReady;
        };
        state.status = status.clone();

        let clear_inputs = source == InvokeSource::Manual
            && !status.is_failed()
            && self.properties.auto_clear
            && !state.auto_invoke;
        if clear_inputs {
            if let Some(parameters) = state.parameters.as_mut() {
                parameters.clear_inputs();
                debug!(widget = %self.widget_id, "cleared inputs after invocation");
            }
        }
        drop(state);

        if status.is_failed() {
            self.scheduler.suspend(SuspendReason::InvocationFailed);
        } else {
            self.broadcaster.publish(&status);
        }
        InvocationOutcome::Completed(status)
    }

    async fn run(&self, source: InvokeSource) -> InvocationOutcome {
        match self.begin(source) {
            Ok(ticket) => self.complete(ticket).await,
            Err(outcome) => outcome,
        }
    }
}

#[async_trait]
impl InvocationTarget for ReducerInner {
    fn status(&self) -> InvocationStatus {
        self.state.lock().status.clone()
    }

    async fn invoke_scheduled(&self) -> InvocationOutcome {
        self.run(InvokeSource::Scheduled).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcaster::BroadcastChannel;
    use crate::memory::{MemoryElement, MemoryTrigger};
    use crate::page::{BoundElement, ChildElement, ChildKind, ContractDescriptor, Property};
    use chainbind_rpc_client::ChainResult;
    use chainbind_smart_contract::{AbiEntry, AbiParameter, ContractAbi, StateMutability};
    use chainbind_telemetry::QueuedNotifier;
    use serde_json::json;

    struct EchoRead;

    #[async_trait]
    impl ReadContract for EchoRead {
        async fn call(&self, _method: &str, args: Vec<Value>) -> ChainResult<Value> {
            Ok(Value::Array(args))
        }
    }

    fn widget(method: &str, element: Arc<MemoryElement>, trigger: Arc<MemoryTrigger>) -> WidgetInfo {
        WidgetInfo {
            id: "widget-1".to_string(),
            children: vec![
                ChildElement {
                    id: "input-1".to_string(),
                    kind: ChildKind::Inputs(vec![InputBinding::new(element, "owner")]),
                },
                ChildElement {
                    id: "invoke-1".to_string(),
                    kind: ChildKind::Invoke(vec![trigger as Arc<dyn TriggerElement>]),
                },
                ChildElement {
                    id: "output-1".to_string(),
                    kind: ChildKind::Output,
                },
            ],
            properties: vec![Property::new("methodName", method)],
            has_inputs: true,
            is_transaction: false,
            contract: ContractDescriptor {
                abi: ContractAbi::new(vec![AbiEntry::function(
                    "balanceOf",
                    vec![AbiParameter::new("owner", "address")],
                    StateMutability::View,
                )]),
                address: "0xcontract".to_string(),
                network_id: 1,
            },
        }
    }

    fn collaborators(notifier: Arc<QueuedNotifier>, channel: &BroadcastChannel) -> Collaborators {
        Collaborators::new(
            notifier,
            Arc::new(channel.clone()),
            Arc::new(Settings::default()),
        )
    }

    #[test]
    fn test_unknown_method_is_notified_once() {
        let notifier = Arc::new(QueuedNotifier::default());
        let channel = BroadcastChannel::default();
        let info = widget(
            "mint",
            MemoryElement::new("").shared(),
            MemoryTrigger::shared(),
        );

        let result = InvocationReducer::new(&info, collaborators(notifier.clone(), &channel));
        assert!(matches!(result, Err(InvokeError::Schema(_))));
        assert_eq!(notifier.len(), 1);
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let notifier = Arc::new(QueuedNotifier::default());
        let channel = BroadcastChannel::default();
        let info = widget(
            "balanceOf",
            MemoryElement::new("").shared(),
            MemoryTrigger::shared(),
        );
        let settings = Settings {
            auto_invoke_interval_ms: 0,
            ..Settings::default()
        };
        let collaborators = Collaborators::new(
            notifier.clone(),
            Arc::new(channel.clone()),
            Arc::new(settings),
        );

        let result = InvocationReducer::new(&info, collaborators);
        assert!(matches!(result, Err(InvokeError::InvalidSettings(_))));
        assert_eq!(notifier.len(), 1);
    }

    #[tokio::test]
    async fn test_invoke_before_mount() {
        let notifier = Arc::new(QueuedNotifier::default());
        let channel = BroadcastChannel::default();
        let info = widget(
            "balanceOf",
            MemoryElement::new("").shared(),
            MemoryTrigger::shared(),
        );
        let reducer = InvocationReducer::new(&info, collaborators(notifier, &channel)).unwrap();

        assert_eq!(
            reducer.invoke(InvokeSource::Manual).await,
            InvocationOutcome::Unmounted
        );
    }

    #[tokio::test]
    async fn test_manual_invocation_broadcasts() {
        let notifier = Arc::new(QueuedNotifier::default());
        let channel = BroadcastChannel::default();
        let mut output = channel.subscribe("output-1");
        let element = MemoryElement::new("$CURRENT_USER").shared();
        let trigger = MemoryTrigger::shared();
        let info = widget("balanceOf", element.clone(), trigger.clone());

        let reducer = InvocationReducer::new(&info, collaborators(notifier, &channel)).unwrap();
        let contracts = ContractHandles {
            read: Some(Arc::new(EchoRead) as Arc<dyn ReadContract>),
            write: None,
        };
        reducer
            .mount(WalletSession::connected("0xABC", 1), contracts)
            .unwrap();
        assert_eq!(element.value(), "0xABC");

        let event = trigger.activate().unwrap();
        assert!(event.default_prevented());
        assert!(event.propagation_stopped());
        assert!(reducer.status().is_pending());

        assert_eq!(output.recv().await, Some(json!(["0xABC"])));
        assert_eq!(reducer.result(), Some(json!(["0xABC"])));

        reducer.unmount();
        assert_eq!(element.value(), "$CURRENT_USER");
        assert!(!trigger.has_handler());
    }

    #[tokio::test]
    async fn test_no_read_instance_is_not_ready() {
        let notifier = Arc::new(QueuedNotifier::default());
        let channel = BroadcastChannel::default();
        let info = widget(
            "balanceOf",
            MemoryElement::new("0x1").shared(),
            MemoryTrigger::shared(),
        );
        let reducer = InvocationReducer::new(&info, collaborators(notifier, &channel)).unwrap();
        reducer
            .mount(WalletSession::disconnected(), ContractHandles::default())
            .unwrap();

        assert_eq!(
            reducer.invoke(InvokeSource::Manual).await,
            InvocationOutcome::NotReady
        );
        assert_eq!(reducer.status(), InvocationStatus::Idle);
    }
}

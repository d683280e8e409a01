//! Shared fixtures for the invoker integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chainbind_config::Settings;
use chainbind_invoker::{
    BroadcastChannel, ChildElement, ChildKind, Collaborators, ContractDescriptor, InputBinding,
    MemoryElement, MemoryTrigger, Property, TriggerElement, WidgetInfo,
};
use chainbind_rpc_client::{
    tx_channel, ChainResult, ReadContract, SendOptions, TxEvent, TxEventStream, WriteContract,
};
use chainbind_smart_contract::ContractAbi;
use chainbind_telemetry::{Notifier, QueuedNotifier};
use mockall::mock;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::Semaphore;

pub const USER: &str = "0xABC0000000000000000000000000000000000001";
pub const CONTRACT: &str = "0xC0FFEE0000000000000000000000000000000002";

mock! {
    pub Notifications {}

    impl Notifier for Notifications {
        fn notify_error(&self, message: &str);
        fn notify_info(&self, message: &str);
    }
}

pub fn token_abi() -> ContractAbi {
    ContractAbi::from_json_value(json!([
        {"type": "function", "name": "balanceOf", "stateMutability": "view",
         "inputs": [{"name": "owner", "type": "address"}],
         "outputs": [{"name": "", "type": "uint256"}]},
        {"type": "function", "name": "allowance", "stateMutability": "view",
         "inputs": [{"name": "owner", "type": "address"}, {"name": "spender", "type": "address"}],
         "outputs": [{"name": "", "type": "uint256"}]},
        {"type": "function", "name": "totalSupply", "stateMutability": "view",
         "inputs": [], "outputs": [{"name": "", "type": "uint256"}]},
        {"type": "function", "name": "deposit", "stateMutability": "payable",
         "inputs": [], "outputs": []},
        {"type": "function", "name": "buy", "stateMutability": "payable",
         "inputs": [{"name": "amount", "type": "uint256"}, {"name": "EthValue", "type": "uint256"}],
         "outputs": []},
        {"type": "function", "name": "transfer", "stateMutability": "nonpayable",
         "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
         "outputs": [{"name": "", "type": "bool"}]}
    ]))
    .expect("fixture ABI parses")
}

/// Read instance answering from a script; an empty script answers `default`.
pub struct ScriptedRead {
    responses: Mutex<VecDeque<ChainResult<Value>>>,
    default: ChainResult<Value>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedRead {
    pub fn answering(value: Value) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            default: Ok(value),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn failing(error: chainbind_rpc_client::ChainError) -> Self {
        Self {
            default: Err(error),
            ..Self::answering(Value::Null)
        }
    }

    pub fn then(self, response: ChainResult<Value>) -> Self {
        self.responses.lock().push_back(response);
        self
    }

    /// Every call waits for one permit of the returned semaphore.
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(gate.clone());
        (self, gate)
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ReadContract for ScriptedRead {
    async fn call(&self, method: &str, args: Vec<Value>) -> ChainResult<Value> {
        self.calls.lock().push((method.to_string(), args));
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate open").forget();
        }
        let scripted = self.responses.lock().pop_front();
        scripted.unwrap_or_else(|| self.default.clone())
    }
}

/// Write instance that accepts every transaction and reports a receipt.
#[derive(Default)]
pub struct RecordingWrite {
    sent: Mutex<Vec<(String, Vec<Value>, SendOptions)>>,
}

impl RecordingWrite {
    pub fn sent(&self) -> Vec<(String, Vec<Value>, SendOptions)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl WriteContract for RecordingWrite {
    async fn send(
        &self,
        method: &str,
        args: Vec<Value>,
        options: SendOptions,
    ) -> ChainResult<TxEventStream> {
        let index = {
            let mut sent = self.sent.lock();
            sent.push((method.to_string(), args, options));
            sent.len()
        };
        let (tx, stream) = tx_channel();
        tx.send(TxEvent::Submitted {
            hash: format!("0xtx{index}"),
        });
        tx.send(TxEvent::Receipt {
            receipt: json!({"status": true}),
        });
        Ok(stream)
    }
}

/// Builder for widget descriptors.
pub struct WidgetBuilder {
    method: String,
    inputs: Vec<InputBinding>,
    triggers: Vec<Arc<dyn TriggerElement>>,
    outputs: Vec<String>,
    properties: Vec<Property>,
    is_transaction: bool,
    network_id: u64,
}

impl WidgetBuilder {
    pub fn new(method: &str) -> Self {
        Self {
            method: method.to_string(),
            inputs: Vec::new(),
            triggers: Vec::new(),
            outputs: vec!["output-1".to_string()],
            properties: Vec::new(),
            is_transaction: false,
            network_id: 1,
        }
    }

    pub fn input(mut self, argument_name: &str, element: Arc<MemoryElement>) -> Self {
        self.inputs.push(InputBinding::new(element, argument_name));
        self
    }

    pub fn trigger(mut self, trigger: Arc<MemoryTrigger>) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn property(mut self, key: &str, value: &str) -> Self {
        self.properties.push(Property::new(key, value));
        self
    }

    pub fn transaction(mut self) -> Self {
        self.is_transaction = true;
        self
    }

    pub fn build(self) -> WidgetInfo {
        let mut properties = vec![Property::new("methodName", self.method.clone())];
        properties.extend(self.properties);

        let mut children = Vec::new();
        let has_inputs = !self.inputs.is_empty();
        if has_inputs {
            children.push(ChildElement {
                id: "input-1".to_string(),
                kind: ChildKind::Inputs(self.inputs),
            });
        }
        if !self.triggers.is_empty() {
            children.push(ChildElement {
                id: "invoke-1".to_string(),
                kind: ChildKind::Invoke(self.triggers),
            });
        }
        for id in self.outputs {
            children.push(ChildElement {
                id,
                kind: ChildKind::Output,
            });
        }

        WidgetInfo {
            id: format!("widget-{}", self.method),
            children,
            properties,
            has_inputs,
            is_transaction: self.is_transaction,
            contract: ContractDescriptor {
                abi: token_abi(),
                address: CONTRACT.to_string(),
                network_id: self.network_id,
            },
        }
    }
}

pub struct Harness {
    pub notifier: Arc<QueuedNotifier>,
    pub channel: BroadcastChannel,
    pub collaborators: Collaborators,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_notifier_queue(Arc::new(QueuedNotifier::default()))
    }

    fn with_notifier_queue(notifier: Arc<QueuedNotifier>) -> Self {
        let channel = BroadcastChannel::default();
        let collaborators = Collaborators::new(
            notifier.clone(),
            Arc::new(channel.clone()),
            Arc::new(Settings::default()),
        );
        Self {
            notifier,
            channel,
            collaborators,
        }
    }

    /// Same channel and settings, notifications going to `notifier`.
    pub fn with_notifier(&self, notifier: Arc<dyn Notifier>) -> Collaborators {
        Collaborators {
            notifier,
            ..self.collaborators.clone()
        }
    }
}

/// Lets spawned tasks run to their next suspension point.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

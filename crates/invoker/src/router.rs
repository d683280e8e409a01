//! Contract instance bootstrap for mounted widgets.

use std::sync::Arc;

use chainbind_rpc_client::{ProviderFactory, WalletSession, WriteContract};
use tracing::{debug, info, warn};

use crate::error::{InvokeError, InvokeResult};
use crate::page::{ContractDescriptor, WidgetInfo};
use crate::reducer::{Collaborators, ContractHandles, InvocationReducer};

/// A widget bound to its contract instances.
#[derive(Debug)]
pub struct MountedWidget {
    contract: ContractDescriptor,
    network: String,
    handles: ContractHandles,
    reducer: InvocationReducer,
}

impl MountedWidget {
    pub fn reducer(&self) -> &InvocationReducer {
        &self.reducer
    }

    pub fn contract(&self) -> &ContractDescriptor {
        &self.contract
    }

    /// Network name the read instance is connected to.
    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn has_write_instance(&self) -> bool {
        self.handles.write.is_some()
    }

    pub fn unmount(self) {
        self.reducer.unmount();
    }
}

/// Builds contract instances for widgets and keeps them in step with the
/// wallet session.
pub struct ContractRouter {
    factory: Arc<dyn ProviderFactory>,
    collaborators: Collaborators,
}

impl ContractRouter {
    pub fn new(factory: Arc<dyn ProviderFactory>, collaborators: Collaborators) -> Self {
        Self {
            factory,
            collaborators,
        }
    }

    /// Creates the read instance (and the write instance when the wallet is
    /// enabled), then builds and mounts the widget's reducer.
    pub fn mount(&self, info: &WidgetInfo, wallet: WalletSession) -> InvokeResult<MountedWidget> {
        let contract = info.contract.clone();
        let network = self
            .collaborators
            .settings
            .networks
            .name_of(contract.network_id)
            .ok_or(InvokeError::UnknownNetwork(contract.network_id))?;

        let read = self
            .factory
            .read_contract(&network, &contract.address, &contract.abi)?;
        let handles = ContractHandles {
            read: Some(read),
            write: self.write_contract(&wallet, &contract),
        };
        debug!(
            widget = %info.id,
            %network,
            write = handles.write.is_some(),
            "contract instances ready"
        );

        let reducer = InvocationReducer::new(info, self.collaborators.clone())?;
        reducer.mount(wallet, handles.clone())?;
        info!(widget = %info.id, address = %contract.address, %network, "widget routed");

        Ok(MountedWidget {
            contract,
            network,
            handles,
            reducer,
        })
    }

    /// Rebuilds the write instance for a new account or chain and rebinds
    /// the widget.
    pub fn wallet_changed(&self, widget: &mut MountedWidget, wallet: WalletSession) {
        widget.handles.write = self.write_contract(&wallet, &widget.contract);
        widget
            .reducer
            .rebind(wallet, Some(widget.handles.clone()));
    }

    /// A signer-backed instance, or `None` when the wallet is disabled or the
    /// provider refuses. Reads keep working either way.
    fn write_contract(
        &self,
        wallet: &WalletSession,
        contract: &ContractDescriptor,
    ) -> Option<Arc<dyn WriteContract>> {
        if !wallet.enabled {
            return None;
        }
        match self
            .factory
            .write_contract(wallet, &contract.address, &contract.abi)
        {
            Ok(write) => Some(write),
            Err(err) => {
                warn!(address = %contract.address, error = %err, "write instance unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcaster::BroadcastChannel;
    use crate::page::Property;
    use async_trait::async_trait;
    use chainbind_config::Settings;
    use chainbind_rpc_client::{ChainError, ChainResult, ReadContract, SendOptions, TxEventStream};
    use chainbind_smart_contract::{AbiEntry, ContractAbi, StateMutability};
    use chainbind_telemetry::QueuedNotifier;
    use parking_lot::Mutex;
    use serde_json::Value;

    struct NullContract;

    #[async_trait]
    impl ReadContract for NullContract {
        async fn call(&self, _method: &str, _args: Vec<Value>) -> ChainResult<Value> {
            Ok(Value::Null)
        }
    }

    #[async_trait]
    impl WriteContract for NullContract {
        async fn send(
            &self,
            _method: &str,
            _args: Vec<Value>,
            _options: SendOptions,
        ) -> ChainResult<TxEventStream> {
            Err(ChainError::Rejected("unused".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingFactory {
        networks: Mutex<Vec<String>>,
        writes: Mutex<usize>,
    }

    impl ProviderFactory for RecordingFactory {
        fn read_contract(
            &self,
            network: &str,
            _address: &str,
            _abi: &ContractAbi,
        ) -> ChainResult<Arc<dyn ReadContract>> {
            self.networks.lock().push(network.to_string());
            Ok(Arc::new(NullContract))
        }

        fn write_contract(
            &self,
            _wallet: &WalletSession,
            _address: &str,
            _abi: &ContractAbi,
        ) -> ChainResult<Arc<dyn WriteContract>> {
            *self.writes.lock() += 1;
            Ok(Arc::new(NullContract))
        }
    }

    fn info(network_id: u64) -> WidgetInfo {
        WidgetInfo {
            id: "widget-1".to_string(),
            children: Vec::new(),
            properties: vec![Property::new("methodName", "totalSupply")],
            has_inputs: false,
            is_transaction: false,
            contract: ContractDescriptor {
                abi: ContractAbi::new(vec![AbiEntry::function(
                    "totalSupply",
                    Vec::new(),
                    StateMutability::View,
                )]),
                address: "0xcontract".to_string(),
                network_id,
            },
        }
    }

    fn router(factory: Arc<RecordingFactory>) -> ContractRouter {
        ContractRouter::new(
            factory,
            Collaborators::new(
                Arc::new(QueuedNotifier::default()),
                Arc::new(BroadcastChannel::default()),
                Arc::new(Settings::default()),
            ),
        )
    }

    #[tokio::test]
    async fn test_mount_resolves_network() {
        let factory = Arc::new(RecordingFactory::default());
        let router = router(factory.clone());

        let mut widget = router
            .mount(&info(5), WalletSession::disconnected())
            .unwrap();
        assert_eq!(widget.network(), "goerli");
        assert_eq!(factory.networks.lock().as_slice(), ["goerli".to_string()]);
        assert!(!widget.has_write_instance());
        assert!(widget.reducer().is_mounted());

        router.wallet_changed(&mut widget, WalletSession::connected("0xABC", 5));
        assert!(widget.has_write_instance());
        assert_eq!(*factory.writes.lock(), 1);

        widget.unmount();
    }

    #[tokio::test]
    async fn test_unknown_network() {
        let router = router(Arc::new(RecordingFactory::default()));
        let result = router.mount(&info(999), WalletSession::disconnected());
        assert!(matches!(result, Err(InvokeError::UnknownNetwork(999))));
    }
}

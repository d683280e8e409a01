use std::sync::Arc;

use chainbind_smart_contract::ContractAbi;

use crate::contract_client::{ReadContract, WriteContract};
use crate::error::ChainResult;
use crate::wallet::WalletSession;

/// Builds contract instances for a widget.
///
/// Implementations own the providers (a public node per network for reads,
/// the injected wallet for writes); instances are shared with the
/// orchestrator by reference.
pub trait ProviderFactory: Send + Sync {
    /// Read-only instance on the named network (`"mainnet"`, `"goerli"`, ...).
    fn read_contract(
        &self,
        network: &str,
        address: &str,
        abi: &ContractAbi,
    ) -> ChainResult<Arc<dyn ReadContract>>;

    /// Signer-backed instance for the wallet session.
    fn write_contract(
        &self,
        wallet: &WalletSession,
        address: &str,
        abi: &ContractAbi,
    ) -> ChainResult<Arc<dyn WriteContract>>;
}

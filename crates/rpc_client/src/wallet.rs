use serde::{Deserialize, Serialize};

/// Snapshot of the injected wallet the page is connected to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSession {
    /// Active account, once the user has granted access.
    pub address: Option<String>,
    /// Chain the wallet is currently connected to.
    pub chain_id: Option<u64>,
    /// Whether a signer is available.
    pub enabled: bool,
}

impl WalletSession {
    /// A connected wallet with a signer.
    pub fn connected(address: impl Into<String>, chain_id: u64) -> Self {
        Self {
            address: Some(address.into()),
            chain_id: Some(chain_id),
            enabled: true,
        }
    }

    /// No wallet, or access not granted yet.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// True when the wallet can sign for `network_id`.
    pub fn can_sign_on(&self, network_id: u64) -> bool {
        self.enabled && self.chain_id == Some(network_id)
    }
}

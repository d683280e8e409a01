//! chainbind chain client seam
//!
//! The orchestrator never talks to a node directly. It is handed contract
//! instances that implement [`ReadContract`] (calls without a signer) and
//! [`WriteContract`] (signed transactions), produced by a
//! [`ProviderFactory`]. ABI encoding, signing and transport live behind
//! these traits.

mod contract_client;
mod error;
mod provider;
mod tx_events;
mod wallet;

pub use contract_client::{ReadContract, SendOptions, WriteContract};
pub use error::{ChainError, ChainResult};
pub use provider::ProviderFactory;
pub use tx_events::{tx_channel, TxEvent, TxEventSender, TxEventStream, TxState, TxTracker};
pub use wallet::WalletSession;

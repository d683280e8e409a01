//! Chain id to network name mapping

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Networks known out of the box, by chain id.
pub const DEFAULT_NETWORKS: &[(u64, &str)] = &[
    (1, "mainnet"),
    (3, "ropsten"),
    (4, "rinkeby"),
    (5, "goerli"),
    (42, "kovan"),
    (11155111, "sepolia"),
];

/// Network names keyed by chain id.
///
/// Keys are kept as strings so the table reads naturally from TOML:
///
/// ```toml
/// [networks]
/// 1 = "mainnet"
/// 137 = "matic"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkTable {
    names: BTreeMap<String, String>,
}

impl Default for NetworkTable {
    fn default() -> Self {
        let names = DEFAULT_NETWORKS
            .iter()
            .map(|(id, name)| (id.to_string(), (*name).to_string()))
            .collect();
        Self { names }
    }
}

impl NetworkTable {
    pub fn empty() -> Self {
        Self {
            names: BTreeMap::new(),
        }
    }

    /// Lower-cased network name for `chain_id`.
    #[must_use]
    pub fn name_of(&self, chain_id: u64) -> Option<String> {
        self.names
            .get(&chain_id.to_string())
            .map(|name| name.to_lowercase())
    }

    pub fn insert(&mut self, chain_id: u64, name: impl Into<String>) {
        self.names.insert(chain_id.to_string(), name.into());
    }

    /// Adds entries from `other`, overriding existing ids.
    pub fn merge(&mut self, other: &NetworkTable) {
        for (id, name) in &other.names {
            self.names.insert(id.clone(), name.clone());
        }
    }

    /// Ids that are not plain unsigned integers.
    pub(crate) fn invalid_ids(&self) -> Vec<&str> {
        self.names
            .keys()
            .filter(|id| id.parse::<u64>().is_err())
            .map(String::as_str)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

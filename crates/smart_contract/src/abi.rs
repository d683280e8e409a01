//! Application binary interface of an EVM contract.
//!
//! Only the parts of the JSON ABI needed to bind page elements to methods are
//! modelled; encoding and decoding of call data belong to the chain client.

use serde::{Deserialize, Serialize};

use crate::error::AbiResult;

/// Kind of an ABI entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbiEntryKind {
    #[default]
    Function,
    Constructor,
    Event,
    Error,
    Fallback,
    Receive,
}

/// Declared state mutability of a function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    NonPayable,
    Payable,
}

/// One named, typed parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, rename = "internalType", skip_serializing_if = "Option::is_none")]
    pub internal_type: Option<String>,
}

impl AbiParameter {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            internal_type: None,
        }
    }
}

/// One entry of the ABI array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEntry {
    #[serde(default, rename = "type")]
    pub kind: AbiEntryKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParameter>,
    #[serde(default)]
    pub outputs: Vec<AbiParameter>,
    #[serde(default, rename = "stateMutability", skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<StateMutability>,
    /// Pre-0.4.16 compilers flag read-only functions with `constant`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payable: Option<bool>,
}

impl AbiEntry {
    /// Builds a function entry.
    pub fn function(
        name: impl Into<String>,
        inputs: Vec<AbiParameter>,
        state_mutability: StateMutability,
    ) -> Self {
        Self {
            kind: AbiEntryKind::Function,
            name: name.into(),
            inputs,
            outputs: Vec::new(),
            state_mutability: Some(state_mutability),
            constant: None,
            payable: None,
        }
    }

    /// True when calling the function cannot change contract state.
    pub fn is_read_only(&self) -> bool {
        match self.state_mutability {
            Some(StateMutability::View | StateMutability::Pure) => true,
            Some(_) => false,
            None => self.constant.unwrap_or(false),
        }
    }
}

/// Contract ABI, the JSON array emitted by the Solidity compiler.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractAbi {
    pub entries: Vec<AbiEntry>,
}

impl ContractAbi {
    pub fn new(entries: Vec<AbiEntry>) -> Self {
        Self { entries }
    }

    pub fn from_json_str(json: &str) -> AbiResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> AbiResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// First function declared under `name`.
    ///
    /// Overloads are not distinguished; the first declaration wins.
    pub fn find_function(&self, name: &str) -> Option<&AbiEntry> {
        self.entries
            .iter()
            .find(|entry| entry.kind == AbiEntryKind::Function && entry.name == name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &AbiEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.kind == AbiEntryKind::Function)
    }
}

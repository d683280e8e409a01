//! Resolved view of a single contract method.

use serde::{Deserialize, Serialize};

use crate::abi::ContractAbi;
use crate::error::{AbiError, AbiResult};

/// Name given to unnamed inputs, which pages use as boolean flags.
pub const FLAG_ARGUMENT: &str = "$true";

/// Maps an empty argument name to [`FLAG_ARGUMENT`].
pub fn normalize_argument_name(name: &str) -> &str {
    if name.is_empty() {
        FLAG_ARGUMENT
    } else {
        name
    }
}

/// One declared input of a method.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A method resolved from an ABI.
///
/// `inputs` keep the ABI declaration order, which is the positional order of
/// the call arguments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub inputs: Vec<InputDescriptor>,
    pub is_transaction: bool,
}

impl MethodDescriptor {
    /// Looks `name` up in `abi`.
    pub fn resolve(abi: &ContractAbi, name: &str, is_transaction: bool) -> AbiResult<Self> {
        let entry = abi
            .find_function(name)
            .ok_or_else(|| AbiError::MethodNotFound {
                name: name.to_string(),
            })?;

        let inputs = entry
            .inputs
            .iter()
            .map(|input| InputDescriptor {
                name: normalize_argument_name(&input.name).to_string(),
                kind: input.kind.clone(),
            })
            .collect();

        Ok(Self {
            name: entry.name.clone(),
            inputs,
            is_transaction,
        })
    }

    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|input| input.name.as_str())
    }

    pub fn has_inputs(&self) -> bool {
        !self.inputs.is_empty()
    }

    /// Position of the input called `name`, after normalisation.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        let name = normalize_argument_name(name);
        self.inputs.iter().position(|input| input.name == name)
    }
}

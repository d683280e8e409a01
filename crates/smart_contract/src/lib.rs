//! # chainbind smart contract model
//!
//! Contract-facing data types shared by the rest of the workspace.
//!
//! ## Components
//!
//! - **ABI**: the JSON interface description of an EVM contract
//! - **MethodDescriptor**: one resolved method, its inputs in declared order
//! - **Units**: conversion between display units and contract units
//!
//! ## Example
//!
//! ```rust
//! use chainbind_smart_contract::{ContractAbi, MethodDescriptor};
//!
//! let abi = ContractAbi::from_json_str(
//!     r#"[{"type":"function","name":"balanceOf","stateMutability":"view",
//!          "inputs":[{"name":"owner","type":"address"}],
//!          "outputs":[{"name":"","type":"uint256"}]}]"#,
//! )
//! .unwrap();
//!
//! let method = MethodDescriptor::resolve(&abi, "balanceOf", false).unwrap();
//! assert_eq!(method.input_names().collect::<Vec<_>>(), vec!["owner"]);
//! ```

pub mod abi;
pub mod error;
pub mod method_descriptor;
pub mod units;

pub use abi::{AbiEntry, AbiEntryKind, AbiParameter, ContractAbi, StateMutability};
pub use error::{AbiError, AbiResult, ConversionError};
pub use method_descriptor::{
    normalize_argument_name, InputDescriptor, MethodDescriptor, FLAG_ARGUMENT,
};
pub use units::{convert_units, EthUnit};

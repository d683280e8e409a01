//! Turns bound input elements into call arguments.
//!
//! A binding pass reads every bound element once, records its raw value for
//! later restoration, substitutes the current-user placeholder with the
//! active address, writes the substituted value back to the element and
//! converts it to contract units when the element asks for it. Arguments are
//! then laid out in ABI order from the resulting [`ParameterSet`].

use std::sync::Arc;

use chainbind_config::{CONTRACT_UNITS_ATTRIBUTE, CURRENT_USER_TOKEN, DISPLAY_UNITS_ATTRIBUTE};
use chainbind_smart_contract::{
    convert_units, normalize_argument_name, AbiResult, ContractAbi, MethodDescriptor,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::page::{BoundElement, InputBinding};

/// Argument name whose value is sent as the transaction value instead of a
/// positional argument.
pub const ETH_VALUE_ARGUMENT: &str = "EthValue";

/// One bound input for the current binding pass.
#[derive(Clone)]
pub struct ParameterBinding {
    element: Arc<dyn BoundElement>,
    /// Normalised argument name.
    pub argument_name: String,
    /// Element value before any substitution; restored on teardown.
    pub raw_value: String,
    /// Value after placeholder substitution.
    pub resolved_value: String,
    /// Value in contract units.
    pub converted_value: String,
    /// The placeholder was present but no address was available.
    pub unresolved: bool,
}

impl ParameterBinding {
    pub fn element(&self) -> &Arc<dyn BoundElement> {
        &self.element
    }
}

/// Bindings of one method for one binding pass.
#[derive(Clone)]
pub struct ParameterSet {
    method: MethodDescriptor,
    bindings: Vec<ParameterBinding>,
    /// Elements bound to undeclared arguments, with their raw values. They
    /// feed no argument but are still cleared and restored.
    ignored: Vec<(Arc<dyn BoundElement>, String)>,
}

impl ParameterSet {
    pub fn method(&self) -> &MethodDescriptor {
        &self.method
    }

    pub fn bindings(&self) -> &[ParameterBinding] {
        &self.bindings
    }

    /// Later bindings override earlier ones; empty values never do.
    fn value_of(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|binding| binding.argument_name == name && !binding.converted_value.is_empty())
            .map(|binding| binding.converted_value.as_str())
    }

    /// Positional arguments: one per declared input except `EthValue`, in
    /// ABI order. Inputs without a bound, non-empty value are `""`.
    pub fn arguments(&self) -> Vec<Value> {
        self.method
            .inputs
            .iter()
            .filter(|input| input.name != ETH_VALUE_ARGUMENT)
            .map(|input| Value::String(self.value_of(&input.name).unwrap_or_default().to_string()))
            .collect()
    }

    /// Value carried by the `EthValue` binding, if any.
    pub fn eth_value(&self) -> Option<String> {
        self.value_of(ETH_VALUE_ARGUMENT).map(str::to_string)
    }

    /// True when the current-user placeholder could not be resolved.
    pub fn has_unresolved(&self) -> bool {
        self.bindings.iter().any(|binding| binding.unresolved)
    }

    /// True when the method declares positional inputs and none of them has
    /// a value.
    pub fn all_empty(&self) -> bool {
        let arguments = self.arguments();
        !arguments.is_empty()
            && arguments
                .iter()
                .all(|argument| argument.as_str().map_or(true, str::is_empty))
    }

    /// Empties every input element of the widget.
    pub fn clear_inputs(&mut self) {
        for (element, _) in &self.ignored {
            element.set_value("");
        }
        for binding in &mut self.bindings {
            binding.element.set_value("");
            binding.resolved_value.clear();
            binding.converted_value.clear();
            binding.unresolved = false;
        }
    }

    /// Writes every raw value back to its element.
    pub fn restore(&self) {
        for binding in &self.bindings {
            binding.element.set_value(&binding.raw_value);
        }
        for (element, raw_value) in &self.ignored {
            element.set_value(raw_value);
        }
        debug!(
            method = %self.method.name,
            count = self.bindings.len(),
            "restored bound elements"
        );
    }
}

/// Reads, substitutes and converts bound element values.
#[derive(Debug, Clone)]
pub struct ParameterExtractor {
    current_user_token: String,
}

impl Default for ParameterExtractor {
    fn default() -> Self {
        Self::new(CURRENT_USER_TOKEN)
    }
}

impl ParameterExtractor {
    pub fn new(current_user_token: impl Into<String>) -> Self {
        Self {
            current_user_token: current_user_token.into(),
        }
    }

    /// Resolves `method_name` in `abi` and binds `inputs` to it.
    pub fn extract(
        &self,
        abi: &ContractAbi,
        method_name: &str,
        is_transaction: bool,
        inputs: &[InputBinding],
        address: Option<&str>,
    ) -> AbiResult<ParameterSet> {
        let method = MethodDescriptor::resolve(abi, method_name, is_transaction)?;
        Ok(self.bind(&method, inputs, address))
    }

    /// Starts a binding pass.
    ///
    /// Bindings naming an argument the method does not declare (other than
    /// `EthValue`) are ignored.
    pub fn bind(
        &self,
        method: &MethodDescriptor,
        inputs: &[InputBinding],
        address: Option<&str>,
    ) -> ParameterSet {
        let mut bindings = Vec::with_capacity(inputs.len());
        let mut ignored = Vec::new();
        for input in inputs {
            let argument_name = normalize_argument_name(&input.argument_name).to_string();
            let raw_value = input.element.value();
            if argument_name != ETH_VALUE_ARGUMENT && method.position_of(&argument_name).is_none() {
                debug!(
                    method = %method.name,
                    argument = %argument_name,
                    "ignoring binding for undeclared argument"
                );
                ignored.push((input.element.clone(), raw_value));
                continue;
            }

            let mut binding = ParameterBinding {
                element: input.element.clone(),
                argument_name,
                raw_value: raw_value.clone(),
                resolved_value: String::new(),
                converted_value: String::new(),
                unresolved: false,
            };
            self.apply(&mut binding, &raw_value, address);
            bindings.push(binding);
        }

        ParameterSet {
            method: method.clone(),
            bindings,
            ignored,
        }
    }

    /// Re-reads the elements of an existing pass, keeping the recorded raw
    /// values.
    pub fn refresh(&self, set: &mut ParameterSet, address: Option<&str>) {
        for binding in &mut set.bindings {
            let current = binding.element.value();
            self.apply(binding, &current, address);
        }
    }

    fn apply(&self, binding: &mut ParameterBinding, value: &str, address: Option<&str>) {
        let (resolved, unresolved) = self.substitute(value, address);
        if resolved != value {
            binding.element.set_value(&resolved);
        }
        binding.converted_value = convert(binding.element.as_ref(), &binding.argument_name, &resolved);
        binding.resolved_value = resolved;
        binding.unresolved = unresolved;
    }

    /// Replaces the current-user placeholder; flags it when no address is
    /// known.
    pub fn substitute(&self, value: &str, address: Option<&str>) -> (String, bool) {
        if !value.contains(&self.current_user_token) {
            return (value.to_string(), false);
        }
        match address {
            Some(address) => (value.replacen(&self.current_user_token, address, 1), false),
            None => (value.to_string(), true),
        }
    }
}

/// Converts `value` to contract units when the element declares units.
/// Failures keep the unconverted value.
fn convert(element: &dyn BoundElement, argument_name: &str, value: &str) -> String {
    let display_units = element.attribute(DISPLAY_UNITS_ATTRIBUTE);
    let contract_units = element.attribute(CONTRACT_UNITS_ATTRIBUTE);

    if value.is_empty() || (display_units.is_none() && contract_units.is_none()) {
        return value.to_string();
    }

    match convert_units(display_units.as_deref(), contract_units.as_deref(), value) {
        Ok(converted) => converted,
        Err(err) => {
            warn!(
                argument = %argument_name,
                %value,
                error = %err,
                "There may be an issue with your inputs"
            );
            value.to_string()
        }
    }
}

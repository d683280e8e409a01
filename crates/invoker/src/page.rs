//! Boundary between the orchestrator and the page.
//!
//! The page (a DOM, a native view tree, a test harness) implements the
//! element traits; the orchestrator only reads values, writes values and
//! installs trigger handlers through them.

use std::sync::Arc;

use chainbind_smart_contract::ContractAbi;
use serde::{Deserialize, Serialize};

/// An input element whose value feeds a method argument.
pub trait BoundElement: Send + Sync {
    fn value(&self) -> String;
    fn set_value(&self, value: &str);
    fn attribute(&self, name: &str) -> Option<String>;
}

/// The event that activated a trigger.
pub trait TriggerEvent {
    fn prevent_default(&self);
    fn stop_propagation(&self);
}

/// Handler installed on every trigger of a method.
pub type TriggerHandler = Arc<dyn Fn(&dyn TriggerEvent) + Send + Sync>;

/// An element that starts an invocation when activated (a button, a link).
pub trait TriggerElement: Send + Sync {
    /// Installs `handler`, or removes the current one with `None`.
    fn set_handler(&self, handler: Option<TriggerHandler>);
}

/// Association between an input element and an argument name.
#[derive(Clone)]
pub struct InputBinding {
    pub element: Arc<dyn BoundElement>,
    pub argument_name: String,
}

impl InputBinding {
    pub fn new(element: Arc<dyn BoundElement>, argument_name: impl Into<String>) -> Self {
        Self {
            element,
            argument_name: argument_name.into(),
        }
    }
}

#[derive(Clone)]
pub enum ChildKind {
    /// Elements providing the method arguments.
    Inputs(Vec<InputBinding>),
    /// Elements that run the method.
    Invoke(Vec<Arc<dyn TriggerElement>>),
    /// Display node showing the latest result.
    Output,
}

/// A child node of the widget.
#[derive(Clone)]
pub struct ChildElement {
    pub id: String,
    pub kind: ChildKind,
}

/// One `key`/`value` pair of the widget's declarative configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: String,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// The contract a widget is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDescriptor {
    pub abi: ContractAbi,
    pub address: String,
    pub network_id: u64,
}

/// Everything the page composition layer knows about one widget.
#[derive(Clone)]
pub struct WidgetInfo {
    pub id: String,
    pub children: Vec<ChildElement>,
    pub properties: Vec<Property>,
    pub has_inputs: bool,
    pub is_transaction: bool,
    pub contract: ContractDescriptor,
}

impl WidgetInfo {
    /// All input bindings, in page order.
    pub fn input_bindings(&self) -> Vec<InputBinding> {
        self.children
            .iter()
            .filter_map(|child| match &child.kind {
                ChildKind::Inputs(bindings) => Some(bindings.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn triggers(&self) -> Vec<Arc<dyn TriggerElement>> {
        self.children
            .iter()
            .filter_map(|child| match &child.kind {
                ChildKind::Invoke(triggers) => Some(triggers.iter().cloned()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Ids of the display nodes that receive results.
    pub fn output_ids(&self) -> Vec<String> {
        self.children
            .iter()
            .filter(|child| matches!(child.kind, ChildKind::Output))
            .map(|child| child.id.clone())
            .collect()
    }
}

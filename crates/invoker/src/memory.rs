//! In-memory page elements for headless hosts and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::page::{BoundElement, TriggerElement, TriggerEvent, TriggerHandler};

/// An input element holding its value and attributes in memory.
#[derive(Debug, Default)]
pub struct MemoryElement {
    value: Mutex<String>,
    attributes: HashMap<String, String>,
}

impl MemoryElement {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(value.into()),
            attributes: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl BoundElement for MemoryElement {
    fn value(&self) -> String {
        self.value.lock().clone()
    }

    fn set_value(&self, value: &str) {
        *self.value.lock() = value.to_string();
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }
}

/// Records what a handler did with the activating event.
#[derive(Debug, Default)]
pub struct MemoryEvent {
    default_prevented: AtomicBool,
    propagation_stopped: AtomicBool,
}

impl MemoryEvent {
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::SeqCst)
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.load(Ordering::SeqCst)
    }
}

impl TriggerEvent for MemoryEvent {
    fn prevent_default(&self) {
        self.default_prevented.store(true, Ordering::SeqCst);
    }

    fn stop_propagation(&self) {
        self.propagation_stopped.store(true, Ordering::SeqCst);
    }
}

/// A trigger that is activated programmatically.
#[derive(Default)]
pub struct MemoryTrigger {
    handler: Mutex<Option<TriggerHandler>>,
}

impl MemoryTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn has_handler(&self) -> bool {
        self.handler.lock().is_some()
    }

    /// Runs the installed handler; returns the event it received, or `None`
    /// when no handler is installed.
    pub fn activate(&self) -> Option<MemoryEvent> {
        let handler = self.handler.lock().clone()?;
        let event = MemoryEvent::default();
        handler(&event);
        Some(event)
    }
}

impl TriggerElement for MemoryTrigger {
    fn set_handler(&self, handler: Option<TriggerHandler>) {
        *self.handler.lock() = handler;
    }
}

//! Installs the invocation handler on a widget's trigger elements.

use std::sync::Arc;

use tracing::debug;

use crate::page::{TriggerElement, TriggerHandler};

/// Owns the handler installation on a set of triggers; removes it on
/// [`unbind`](Self::unbind) or drop.
#[derive(Default)]
pub struct TriggerBinder {
    triggers: Vec<Arc<dyn TriggerElement>>,
}

impl TriggerBinder {
    /// Installs the same `handler` on every trigger.
    pub fn bind(triggers: Vec<Arc<dyn TriggerElement>>, handler: TriggerHandler) -> Self {
        for trigger in &triggers {
            trigger.set_handler(Some(handler.clone()));
        }
        debug!(count = triggers.len(), "bound invoke triggers");
        Self { triggers }
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn unbind(&mut self) {
        if self.triggers.is_empty() {
            return;
        }
        for trigger in self.triggers.drain(..) {
            trigger.set_handler(None);
        }
        debug!("unbound invoke triggers");
    }
}

impl Drop for TriggerBinder {
    fn drop(&mut self) {
        self.unbind();
    }
}

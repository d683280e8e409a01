//! User-visible notifications.
//!
//! Toast rendering belongs to the page; the orchestrator only needs somewhere
//! to send messages. [`QueuedNotifier`] buffers them for a UI layer to drain
//! and [`TracingNotifier`] forwards them to the log.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// Severity shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Non-blocking sink for user-visible messages.
pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
    fn notify_info(&self, message: &str);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_error(&self, message: &str) {
        error!(target: "chainbind::notify", "{message}");
    }

    fn notify_info(&self, message: &str) {
        info!(target: "chainbind::notify", "{message}");
    }
}

/// Buffers notifications, oldest dropped beyond `capacity`.
#[derive(Debug)]
pub struct QueuedNotifier {
    capacity: usize,
    queue: Mutex<VecDeque<Notification>>,
}

impl QueuedNotifier {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            queue: Mutex::new(VecDeque::new()),
        }
    }

    fn push(&self, level: NotificationLevel, message: &str) {
        let mut queue = self.queue.lock();
        if queue.len() == self.capacity {
            queue.pop_front();
        }
        queue.push_back(Notification {
            level,
            message: message.to_string(),
        });
    }

    /// Removes and returns every pending notification.
    pub fn drain(&self) -> Vec<Notification> {
        self.queue.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

impl Default for QueuedNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Notifier for QueuedNotifier {
    fn notify_error(&self, message: &str) {
        self.push(NotificationLevel::Error, message);
    }

    fn notify_info(&self, message: &str) {
        self.push(NotificationLevel::Info, message);
    }
}

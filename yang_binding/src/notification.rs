//! Notification emitters
//!
//! A notification record is built from the caller's arguments, handed to
//! the agent through the event channel and forgotten. Emission never
//! blocks and never reports whether anyone was listening.

use ipc::{EventSender, MessagePayload, NotificationEvent};
use lifecycle::LifecycleWatch;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// A declared notification record
pub trait Notification: Serialize {
    /// Notification name as it appears on the wire
    const NAME: &'static str;
}

/// Delivers a module's notifications to the agent
///
/// Clones share the sequence counter, so events from every clone are
/// numbered consecutively.
#[derive(Debug, Clone)]
pub struct NotificationEmitter {
    module: String,
    sender: EventSender,
    watch: LifecycleWatch,
    sequence: Arc<AtomicU64>,
}

impl NotificationEmitter {
    /// Creates an emitter for `module`
    pub fn new(module: impl Into<String>, sender: EventSender, watch: LifecycleWatch) -> Self {
        Self {
            module: module.into(),
            sender,
            watch,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns the emitting module's name
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Sends `record`
    ///
    /// Ignored (with a warning) unless the module is `RUNNING`. The record
    /// is consumed; nothing of it is retained once this returns.
    pub fn emit<N: Notification>(&self, record: N) {
        if !self.watch.is_running() {
            warn!(
                module = %self.module,
                notification = N::NAME,
                state = %self.watch.state(),
                "Notification ignored: module not running"
            );
            return;
        }

        let payload = match MessagePayload::new(&record) {
            Ok(payload) => payload,
            Err(e) => {
                error!(
                    module = %self.module,
                    notification = N::NAME,
                    error = %e,
                    "Cannot encode notification"
                );
                return;
            }
        };
        drop(record);

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(module = %self.module, notification = N::NAME, sequence, "Emitting notification");
        self.sender.send(NotificationEvent {
            module: self.module.clone(),
            event_type: N::NAME.to_string(),
            sequence,
            payload,
        });
    }
}

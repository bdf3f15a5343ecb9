//! Fire-and-forget event channel between emitting modules and the agent

use crate::NotificationEvent;
use std::sync::mpsc;
use tracing::debug;

/// Creates a connected sender/receiver pair
///
/// The channel is unbounded: sending never blocks the emitting module.
pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::channel();
    (EventSender { inner: tx }, EventReceiver { inner: rx })
}

/// Sending end, cloned into every emitter
#[derive(Debug, Clone)]
pub struct EventSender {
    inner: mpsc::Sender<NotificationEvent>,
}

impl EventSender {
    /// Hands an event to the agent
    ///
    /// The caller never learns whether the event reached a subscriber.
    /// Events sent after the receiver is gone are dropped.
    pub fn send(&self, event: NotificationEvent) {
        if let Err(mpsc::SendError(event)) = self.inner.send(event) {
            debug!(
                module = %event.module,
                event_type = %event.event_type,
                "Event receiver gone, dropping notification"
            );
        }
    }
}

/// Receiving end, owned by the agent's fan-out
#[derive(Debug)]
pub struct EventReceiver {
    inner: mpsc::Receiver<NotificationEvent>,
}

impl EventReceiver {
    /// Takes the next pending event without waiting
    pub fn try_recv(&self) -> Option<NotificationEvent> {
        self.inner.try_recv().ok()
    }

    /// Takes every pending event, in emission order
    pub fn drain(&self) -> Vec<NotificationEvent> {
        self.inner.try_iter().collect()
    }
}

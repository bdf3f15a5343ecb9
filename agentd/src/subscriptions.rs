//! # Notification Fan-out
//!
//! Distributes module notifications to subscribers.
//!
//! ## Philosophy
//!
//! - **Never block the emitter**: each subscriber has a bounded queue; when
//!   it is full the oldest pending event is dropped and counted
//! - **Late subscribers catch up**: a bounded history of recent events can
//!   be replayed into a new subscription
//! - **Ordered**: every subscriber sees events in emission order

use core_types::SubscriberId;
use ipc::NotificationEvent;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

/// Default number of notifications kept in history
pub const DEFAULT_HISTORY: usize = 100;

/// Default per-subscriber queue capacity
pub const DEFAULT_QUEUE: usize = 256;

/// Selects which notifications a subscriber receives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    /// Only events from this module
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Only events of this notification type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

impl EventFilter {
    /// Accepts every event
    pub fn all() -> Self {
        Self::default()
    }

    /// Accepts events of `module`
    pub fn module(module: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            event_type: None,
        }
    }

    /// Narrows to one notification type
    pub fn with_event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Checks whether `event` passes the filter
    pub fn matches(&self, event: &NotificationEvent) -> bool {
        self.module.as_deref().map_or(true, |m| m == event.module)
            && self
                .event_type
                .as_deref()
                .map_or(true, |t| t == event.event_type)
    }
}

struct Subscriber {
    filter: EventFilter,
    queue: VecDeque<NotificationEvent>,
    dropped: u64,
}

/// Subscriber registry and notification history
pub struct SubscriptionManager {
    subscribers: HashMap<SubscriberId, Subscriber>,
    history: VecDeque<NotificationEvent>,
    history_capacity: usize,
    queue_capacity: usize,
}

impl SubscriptionManager {
    /// Creates a manager keeping `history_capacity` past events and at most
    /// `queue_capacity` pending events per subscriber
    pub fn new(history_capacity: usize, queue_capacity: usize) -> Self {
        Self {
            subscribers: HashMap::new(),
            history: VecDeque::with_capacity(history_capacity),
            history_capacity,
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Adds a subscriber
    pub fn subscribe(&mut self, filter: EventFilter) -> SubscriberId {
        let id = SubscriberId::new();
        debug!(subscriber = %id, ?filter, "Subscribed");
        self.subscribers.insert(
            id,
            Subscriber {
                filter,
                queue: VecDeque::new(),
                dropped: 0,
            },
        );
        id
    }

    /// Adds a subscriber and queues the matching history for it
    pub fn subscribe_with_replay(&mut self, filter: EventFilter) -> SubscriberId {
        let replay: Vec<NotificationEvent> = self
            .history
            .iter()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect();
        let id = self.subscribe(filter);
        for event in replay {
            self.enqueue(id, event);
        }
        id
    }

    /// Removes a subscriber, discarding its pending events
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let removed = self.subscribers.remove(&id).is_some();
        if removed {
            debug!(subscriber = %id, "Unsubscribed");
        }
        removed
    }

    /// Delivers `event` to every matching subscriber and records it
    pub fn publish(&mut self, event: NotificationEvent) {
        let targets: Vec<SubscriberId> = self
            .subscribers
            .iter()
            .filter(|(_, s)| s.filter.matches(&event))
            .map(|(id, _)| *id)
            .collect();
        for id in targets {
            self.enqueue(id, event.clone());
        }

        if self.history_capacity > 0 {
            self.history.push_back(event);
            while self.history.len() > self.history_capacity {
                self.history.pop_front();
            }
        }
    }

    fn enqueue(&mut self, id: SubscriberId, event: NotificationEvent) {
        let Some(subscriber) = self.subscribers.get_mut(&id) else {
            return;
        };
        if subscriber.queue.len() >= self.queue_capacity {
            subscriber.queue.pop_front();
            subscriber.dropped += 1;
            warn!(
                subscriber = %id,
                dropped = subscriber.dropped,
                "Subscriber queue full, oldest notification dropped"
            );
        }
        subscriber.queue.push_back(event);
    }

    /// Takes every pending event of `id`, oldest first
    pub fn take(&mut self, id: SubscriberId) -> Vec<NotificationEvent> {
        self.subscribers
            .get_mut(&id)
            .map(|s| s.queue.drain(..).collect())
            .unwrap_or_default()
    }

    /// Number of events dropped from the queue of `id`
    pub fn dropped(&self, id: SubscriberId) -> u64 {
        self.subscribers.get(&id).map_or(0, |s| s.dropped)
    }

    /// Most recent events, oldest first
    pub fn history(&self) -> impl Iterator<Item = &NotificationEvent> {
        self.history.iter()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY, DEFAULT_QUEUE)
    }
}

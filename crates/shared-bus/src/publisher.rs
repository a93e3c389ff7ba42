//! # Event Publisher
//!
//! The ledger hands each committed event to the bus, which fans it out over
//! a tokio broadcast channel. Subscriptions filter on their own side; the
//! bus only keeps a per-topic tally of who is listening.

use crate::events::{EventFilter, EventTopic, LedgerEvent};
use crate::subscriber::{InterestGuard, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Publishing side of the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one event. Returns how many live subscriptions want it.
    async fn publish(&self, event: LedgerEvent) -> usize;

    /// Events published since the bus was created, delivered or not.
    fn events_published(&self) -> u64;
}

/// Live subscriptions per topic. Unfiltered subscriptions count under `All`.
#[derive(Debug, Default)]
pub(crate) struct TopicInterest {
    counts: Mutex<HashMap<EventTopic, usize>>,
}

impl TopicInterest {
    pub(crate) fn register(&self, topics: &[EventTopic]) {
        let mut counts = self.counts.lock();
        for topic in topics {
            *counts.entry(*topic).or_insert(0) += 1;
        }
    }

    pub(crate) fn release(&self, topics: &[EventTopic]) {
        let mut counts = self.counts.lock();
        for topic in topics {
            if let Some(count) = counts.get_mut(topic) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    counts.remove(topic);
                }
            }
        }
    }

    fn interested_in(&self, topic: EventTopic) -> usize {
        let counts = self.counts.lock();
        let all = counts.get(&EventTopic::All).copied().unwrap_or(0);
        all + counts.get(&topic).copied().unwrap_or(0)
    }
}

/// Topics a filter is tallied under.
fn interest_keys(filter: &EventFilter) -> Vec<EventTopic> {
    if filter.topics.is_empty() || filter.topics.contains(&EventTopic::All) {
        return vec![EventTopic::All];
    }
    let mut keys = filter.topics.clone();
    keys.sort_by_key(|t| *t as u8);
    keys.dedup();
    keys
}

/// In-process event bus.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<LedgerEvent>,
    interest: Arc<TopicInterest>,
    published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// A bus whose subscribers may fall `capacity` events behind before
    /// they start losing the oldest ones.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            interest: Arc::new(TopicInterest::default()),
            published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to every event published from now on that `filter` accepts.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let keys = interest_keys(&filter);
        self.interest.register(&keys);
        debug!(topics = ?keys, "Subscription opened");

        let guard = InterestGuard::new(Arc::clone(&self.interest), keys);
        Subscription::new(self.sender.subscribe(), filter, guard)
    }

    /// Live subscriptions, whatever their filter.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Live subscriptions whose filter accepts `topic`.
    #[must_use]
    pub fn subscribers_for(&self, topic: EventTopic) -> usize {
        self.interest.interested_in(topic)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: LedgerEvent) -> usize {
        let topic = event.topic();
        self.published.fetch_add(1, Ordering::Relaxed);

        let interested = self.interest.interested_in(topic);
        // Send fails only when nobody at all is subscribed
        if self.sender.send(event).is_err() {
            debug!(?topic, "Event published with no subscribers");
            return 0;
        }
        debug!(?topic, interested, "Event published");
        interested
    }

    fn events_published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

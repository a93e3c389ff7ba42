//! Event sink adapters
//!
//! The bus adapter hands committed ledger events to `shared-bus`, where the
//! oracle pool and any other observer subscribe to them.

use crate::ports::outbound::LedgerEventSink;
use async_trait::async_trait;
use shared_bus::{EventPublisher, InMemoryEventBus, LedgerEvent};
use std::sync::Arc;
use tracing::debug;

pub struct EventBusSink {
    event_bus: Arc<InMemoryEventBus>,
}

impl EventBusSink {
    pub fn new(event_bus: Arc<InMemoryEventBus>) -> Self {
        Self { event_bus }
    }
}

#[async_trait]
impl LedgerEventSink for EventBusSink {
    async fn publish(&self, events: Vec<LedgerEvent>) {
        for event in events {
            let topic = event.topic();
            let receivers = self.event_bus.publish(event).await;
            if receivers == 0 {
                // No subscribers yet; acceptable before the pool starts
                debug!(?topic, "Ledger event published with no subscribers");
            }
        }
    }
}

/// Drops every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullEventSink;

#[async_trait]
impl LedgerEventSink for NullEventSink {
    async fn publish(&self, _events: Vec<LedgerEvent>) {}
}

/// Records events in memory for assertions.
#[derive(Default)]
pub struct RecordingEventSink {
    events: parking_lot::RwLock<Vec<LedgerEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.read().clone()
    }

    pub fn clear(&self) {
        self.events.write().clear();
    }
}

#[async_trait]
impl LedgerEventSink for RecordingEventSink {
    async fn publish(&self, events: Vec<LedgerEvent>) {
        self.events.write().extend(events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::{EventFilter, EventTopic};
    use std::time::Duration;

    #[tokio::test]
    async fn test_bus_sink_publishes_in_order() {
        let bus = Arc::new(InMemoryEventBus::new());
        let mut sub = bus.subscribe(EventFilter::topics(vec![EventTopic::AccessGate]));
        let sink = EventBusSink::new(Arc::clone(&bus));

        sink.publish(vec![
            LedgerEvent::OperationalStatusChanged { operational: false },
            LedgerEvent::OperationalStatusChanged { operational: true },
        ])
        .await;

        for expected in [false, true] {
            let event = tokio::time::timeout(Duration::from_secs(1), sub.recv())
                .await
                .expect("timeout")
                .expect("event");
            assert_eq!(
                event,
                LedgerEvent::OperationalStatusChanged {
                    operational: expected
                }
            );
        }
    }

    #[tokio::test]
    async fn test_recording_sink_keeps_events() {
        let sink = RecordingEventSink::new();
        sink.publish(vec![LedgerEvent::OperationalStatusChanged { operational: false }])
            .await;
        assert_eq!(sink.events().len(), 1);
        sink.clear();
        assert!(sink.events().is_empty());
    }
}

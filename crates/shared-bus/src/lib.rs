//! # Shared Bus - Event Bus for Ledger Notifications
//!
//! Carries the events a committed ledger operation produces to whoever is
//! listening: the oracle pool (which reacts to `OracleRequested`) and the
//! presentation layer (which renders state changes).
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  fs-ledger   │                    │ Oracle Pool  │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Events are published only after the operation that produced them has
//! committed; a rejected operation publishes nothing.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, LedgerEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Events a subscriber may fall behind by before it starts losing the oldest.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

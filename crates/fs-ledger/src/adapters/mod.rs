//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implementations of the outbound ports: value custody, entropy and event
//! publication.

mod custody;
mod entropy;
mod event_bus;

pub use custody::InMemoryCustody;
pub use entropy::{FixedEntropy, OsEntropy};
pub use event_bus::{EventBusSink, NullEventSink, RecordingEventSink};

//! # Shared Types Crate
//!
//! Value types shared by every crate in the FlightSurety workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Address`, `Wei`, `FlightKey` and
//!   `FlightStatus` are defined here and nowhere else.
//! - **Envelope-Only Identity**: Operations never take the caller from their
//!   payload. The `CallContext` supplied by the execution environment is the
//!   sole authority on who is calling and how much value they attached.

pub mod entities;
pub mod envelope;

pub use entities::*;
pub use envelope::CallContext;

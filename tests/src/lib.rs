//! # FlightSurety Test Suite
//!
//! Cross-crate tests that run the ledger, the event bus and the oracle pool
//! together.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── harness.rs        # Ledger + bus + pool fixture
//!     ├── e2e_insurance.rs  # Admission through payout
//!     └── flows.rs          # Event flows and node lifecycle
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fs-tests
//! cargo test -p fs-tests integration::flows::
//! ```

#![allow(dead_code)]

pub mod integration;

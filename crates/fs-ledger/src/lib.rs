//! # fs-ledger
//!
//! The FlightSurety ledger: flight-delay insurance backed by a governance
//! and escrow state machine.
//!
//! ## Overview
//!
//! - **Access gate**: one operational flag plus the administrator role
//! - **Airline registry**: admission by vote, single vote below four members,
//!   then a majority of the registered set
//! - **Funding ledger**: airline capital against a minimum threshold
//! - **Policy book**: premium escrow, resolution credits and withdrawals
//! - **Oracle consensus**: index assignment, status requests, quorum
//!
//! ## Architecture
//!
//! ```text
//! caller ──CallContext──→ LedgerService ──lock──→ LedgerStore
//!                              │                     ├── AccessGate
//!                              │                     ├── AirlineRegistry ←── FundingLedger
//!                              │                     ├── PolicyBook
//!                              │                     └── OracleConsensus ──quorum──→ PolicyBook::resolve
//!                              │
//!                              ├── ValueCustody   (deposit / release, under the lock)
//!                              ├── EntropySource  (index draws, under the lock)
//!                              └── LedgerEventSink (after commit) ──→ shared-bus ──→ oracle pool
//! ```
//!
//! ## Atomicity
//!
//! Calls are serialized by a single store lock. Each call validates all of
//! its preconditions before any value moves, and moves value before any
//! state changes. The one exception is `withdraw`, which zeroes the balance
//! first and restores it if custody refuses the release.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fs_ledger::{LedgerService, LedgerDependencies, LedgerConfig, GenesisConfig};
//! use fs_ledger::ports::LedgerApi;
//!
//! let ledger = LedgerService::new(LedgerDependencies {
//!     custody,
//!     entropy,
//!     events,
//!     config: LedgerConfig::default(),
//!     genesis: GenesisConfig::new(admin, first_airline, "First Air"),
//! })?;
//!
//! ledger.fund(CallContext::with_value(first_airline, ether(10)), first_airline).await?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use config::{GenesisConfig, LedgerConfig};
pub use domain::{
    AirlineSummary, InvariantCheckResult, InvariantViolation, Oracle, Policy,
    StatusRequestSummary,
};
pub use error::{LedgerError, LedgerResult};
pub use ports::{CustodyError, EntropySource, LedgerApi, LedgerEventSink, ValueCustody};
pub use service::{LedgerDependencies, LedgerService};

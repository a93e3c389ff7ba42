//! # fs-oracle-pool
//!
//! A simulated fleet of flight-status oracles. The pool registers its
//! oracles with the ledger at startup, then answers every status request
//! the ledger announces on the event bus.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod error;
pub mod pool;

pub use config::{OraclePoolConfig, StatusStrategy};
pub use error::{PoolError, PoolResult};
pub use pool::{AnswerReport, OraclePool};

//! Integration tests across the ledger, bus and oracle pool.

pub mod e2e_insurance;
pub mod flows;
pub mod harness;

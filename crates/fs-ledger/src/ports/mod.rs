//! Ports module for the ledger

pub mod inbound;
pub mod outbound;

pub use inbound::LedgerApi;
pub use outbound::{CustodyError, EntropySource, LedgerEventSink, ValueCustody};

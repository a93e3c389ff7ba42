//! Error types for the oracle pool

use fs_ledger::LedgerError;
use shared_types::Address;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("Oracle {oracle} failed to register: {source}")]
    Registration {
        oracle: Address,
        #[source]
        source: LedgerError,
    },

    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),
}

pub type PoolResult<T> = Result<T, PoolError>;

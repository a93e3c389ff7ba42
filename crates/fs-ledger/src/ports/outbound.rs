//! Driven ports (outbound dependencies)
//!
//! Custody and entropy are called while the store lock is held, so they are
//! synchronous. Event publication happens after the lock is released.

use async_trait::async_trait;
use shared_bus::LedgerEvent;
use shared_types::{Address, Wei};
use thiserror::Error;

/// Custody rejections
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustodyError {
    /// Sender wallet cannot cover the deposit
    #[error("Wallet {address} holds {available}, needs {required}")]
    InsufficientWallet {
        address: Address,
        available: Wei,
        required: Wei,
    },

    /// Custody cannot cover the release
    #[error("Custody holds {held}, cannot release {requested}")]
    Underfunded { held: Wei, requested: Wei },

    /// Recipient refused the transfer
    #[error("Recipient {address} rejected the transfer")]
    Rejected { address: Address },
}

/// Holds the value the ledger escrows: airline capital, premiums and fees.
pub trait ValueCustody: Send + Sync {
    /// Move `amount` from the caller into custody.
    fn deposit(&self, from: Address, amount: Wei) -> Result<(), CustodyError>;

    /// Move `amount` from custody to `to`.
    fn release(&self, to: Address, amount: Wei) -> Result<(), CustodyError>;

    /// Total currently held.
    fn held(&self) -> Wei;
}

/// Environment-supplied unpredictability for oracle index draws.
///
/// Draws are keyed by caller and a store nonce as well, so this does not
/// need cryptographic strength; a caller just must not be able to choose it.
pub trait EntropySource: Send + Sync {
    fn entropy(&self) -> [u8; 32];
}

/// Receives events of committed operations.
#[async_trait]
pub trait LedgerEventSink: Send + Sync {
    async fn publish(&self, events: Vec<LedgerEvent>);
}

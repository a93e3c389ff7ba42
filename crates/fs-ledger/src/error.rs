//! Error types for the ledger core
//!
//! Every rejected operation surfaces one of these kinds to its caller. A
//! rejected operation has no effect on the store.

use crate::ports::outbound::CustodyError;
use shared_types::{Address, FlightKey, UnknownStatusCode, Wei};
use thiserror::Error;

/// Ledger errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Mutating call while the access gate is closed
    #[error("Ledger is not operational")]
    NotOperational,

    /// Caller lacks the role the operation requires
    #[error("Unauthorized: {caller} may not {action}")]
    Unauthorized {
        caller: Address,
        action: &'static str,
    },

    /// Airline already proposed or oracle already registered
    #[error("Already exists: {what} {address}")]
    AlreadyExists {
        what: &'static str,
        address: Address,
    },

    /// Unknown airline or policy
    #[error("Not found: {what} {key}")]
    NotFound { what: &'static str, key: String },

    /// Airline capital below the minimum for a gated action
    #[error("Insufficient funds: airline {airline} has {funded}, needs {required}")]
    InsufficientFunds {
        airline: Address,
        funded: Wei,
        required: Wei,
    },

    /// Same voter voting twice for the same candidate
    #[error("Duplicate vote: {voter} already voted for {candidate}")]
    DuplicateVote { voter: Address, candidate: Address },

    /// Operation not valid in the entity's current state
    #[error("Invalid state: {reason}")]
    InvalidState { reason: String },

    /// Airline is not both registered and funded
    #[error("Airline {airline} is not eligible to sell insurance")]
    AirlineNotEligible { airline: Address },

    /// Submitting oracle does not hold the index (or is not registered)
    #[error("Oracle {oracle} does not hold index {index}")]
    InvalidOracleIndex { oracle: Address, index: u8 },

    /// No status request for the key
    #[error("No status request for {flight} at index {index}")]
    RequestNotFound { flight: FlightKey, index: u8 },

    /// Request or policy already finalized
    #[error("Already resolved: {flight}")]
    AlreadyResolved { flight: FlightKey },

    /// Amount, code or name outside the accepted range
    #[error("Value out of range: {reason}")]
    ValueOutOfRange { reason: String },

    /// Withdrawal with nothing owed
    #[error("Nothing owed to {insuree}")]
    ZeroBalance { insuree: Address },

    /// Custody rejected a value transfer
    #[error("Transfer failed: {reason}")]
    TransferFailed { reason: String },

    /// Configuration rejected at construction
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl LedgerError {
    pub(crate) fn airline_not_found(airline: Address) -> Self {
        Self::NotFound {
            what: "airline",
            key: airline.to_string(),
        }
    }

    pub(crate) fn out_of_range(reason: impl Into<String>) -> Self {
        Self::ValueOutOfRange {
            reason: reason.into(),
        }
    }
}

impl From<UnknownStatusCode> for LedgerError {
    fn from(err: UnknownStatusCode) -> Self {
        Self::out_of_range(err.to_string())
    }
}

impl From<CustodyError> for LedgerError {
    fn from(err: CustodyError) -> Self {
        Self::TransferFailed {
            reason: err.to_string(),
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

//! Domain layer: the ledger components and the store that owns them

pub mod access_gate;
pub mod airline;
pub mod funding;
pub mod invariants;
pub mod oracle;
pub mod policy;
pub mod store;

pub use access_gate::AccessGate;
pub use airline::{admission_threshold, Airline, AirlineRegistry, AirlineSummary, VoteOutcome};
pub use funding::FundingLedger;
pub use invariants::{check_all_invariants, InvariantCheckResult, InvariantViolation};
pub use oracle::{
    draw_index, Oracle, OracleConsensus, StatusRequest, StatusRequestSummary,
    INDEXES_PER_ORACLE,
};
pub use policy::{Credit, Policy, PolicyBook, PolicyTotals, PremiumSettlement};
pub use store::LedgerStore;

//! # Ledger Invariants
//!
//! Accounting properties that must hold between any two operations:
//! - Solvency: custody holds at least what is owed to insurees
//! - Payout bound: credits never exceed the multiplier times late premiums
//! - Genesis: the genesis airline stays registered with zero votes
//! - Registry count: the cached registered count matches the records
//! - Escrow: the premium total matches the policies on the book

use crate::domain::store::LedgerStore;
use shared_types::{Address, Wei};

// =============================================================================
// INVARIANT CHECKS
// =============================================================================

/// Custody can pay every insuree balance in full.
#[must_use]
pub fn check_solvency(store: &LedgerStore, held: Wei) -> bool {
    held >= store.policies().total_owed()
}

/// Total credited ≤ multiplier × premiums of airline-fault policies.
#[must_use]
pub fn check_payout_bound(store: &LedgerStore) -> bool {
    let totals = store.policies().totals();
    totals.credited <= store.config().payout_for(totals.late_premiums)
}

#[must_use]
pub fn check_genesis(store: &LedgerStore) -> bool {
    let registry = store.airlines();
    registry
        .get(&registry.genesis())
        .is_some_and(|genesis| genesis.registered && genesis.vote_count == 0)
}

#[must_use]
pub fn check_registered_count(store: &LedgerStore) -> bool {
    let counted = store.airlines().iter().filter(|a| a.registered).count();
    counted == store.airlines().registered_count() && counted >= 1
}

#[must_use]
pub fn check_escrow(store: &LedgerStore) -> bool {
    let on_book: Wei = store.policies().iter().map(|p| p.premium).sum();
    on_book == store.policies().totals().premiums_escrowed
}

/// Check all invariants at once.
#[must_use]
pub fn check_all_invariants(store: &LedgerStore, held: Wei) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_solvency(store, held) {
        violations.push(InvariantViolation::Insolvent {
            held,
            owed: store.policies().total_owed(),
        });
    }

    if !check_payout_bound(store) {
        let totals = store.policies().totals();
        violations.push(InvariantViolation::PayoutExceeded {
            credited: totals.credited,
            bound: store.config().payout_for(totals.late_premiums),
        });
    }

    if !check_genesis(store) {
        violations.push(InvariantViolation::GenesisAltered {
            airline: store.airlines().genesis(),
        });
    }

    if !check_registered_count(store) {
        violations.push(InvariantViolation::RegistryCountMismatch {
            cached: store.airlines().registered_count(),
            counted: store.airlines().iter().filter(|a| a.registered).count(),
        });
    }

    if !check_escrow(store) {
        violations.push(InvariantViolation::EscrowMismatch {
            recorded: store.policies().totals().premiums_escrowed,
            on_book: store.policies().iter().map(|p| p.premium).sum(),
        });
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    Valid,
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    Insolvent { held: Wei, owed: Wei },
    PayoutExceeded { credited: Wei, bound: Wei },
    GenesisAltered { airline: Address },
    RegistryCountMismatch { cached: usize, counted: usize },
    EscrowMismatch { recorded: Wei, on_book: Wei },
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Insolvent { held, owed } => {
                write!(f, "custody holds {held} but insurees are owed {owed}")
            }
            Self::PayoutExceeded { credited, bound } => {
                write!(f, "credited {credited} exceeds payout bound {bound}")
            }
            Self::GenesisAltered { airline } => {
                write!(f, "genesis airline {airline} no longer registered with zero votes")
            }
            Self::RegistryCountMismatch { cached, counted } => {
                write!(f, "registered count {cached} but {counted} records registered")
            }
            Self::EscrowMismatch { recorded, on_book } => {
                write!(f, "escrow total {recorded} but policies hold {on_book}")
            }
        }
    }
}

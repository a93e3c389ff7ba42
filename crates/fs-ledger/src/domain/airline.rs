//! Airline registry: the multiparty admission state machine
//!
//! ```text
//! [PROPOSED] ──vote (votes >= threshold)──→ [REGISTERED]
//!     │                                         │
//!     └── vote (votes < threshold) ──┐          └── terminal, never deleted
//!              ↑                     │
//!              └─────────────────────┘
//! ```
//!
//! The threshold is recomputed against the registered set at every vote:
//! while fewer than `bootstrap` airlines are registered one vote admits,
//! afterwards a candidate needs `ceil(N / 2)` votes.

use crate::domain::funding::FundingLedger;
use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use shared_types::{Address, Wei};
use std::collections::{BTreeMap, BTreeSet};

/// An airline participant. Created on proposal, never deleted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Airline {
    pub id: Address,
    pub name: String,
    pub registered: bool,
    pub funded_amount: Wei,
    pub vote_count: u32,
    pub voters: BTreeSet<Address>,
}

impl Airline {
    fn proposed(id: Address, name: String) -> Self {
        Self {
            id,
            name,
            registered: false,
            funded_amount: 0,
            vote_count: 0,
            voters: BTreeSet::new(),
        }
    }
}

/// Read-only view returned by `getAirline`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineSummary {
    pub name: String,
    pub registered: bool,
    pub funded_amount: Wei,
    pub vote_count: u32,
}

impl From<&Airline> for AirlineSummary {
    fn from(airline: &Airline) -> Self {
        Self {
            name: airline.name.clone(),
            registered: airline.registered,
            funded_amount: airline.funded_amount,
            vote_count: airline.vote_count,
        }
    }
}

/// Result of a recorded vote
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteOutcome {
    pub votes: u32,
    pub threshold: usize,
    /// True only on the vote that crossed the threshold
    pub newly_registered: bool,
}

/// Votes needed to admit a candidate when `registered` airlines exist.
#[must_use]
pub fn admission_threshold(registered: usize, bootstrap: usize) -> usize {
    if registered < bootstrap {
        1
    } else {
        registered.div_ceil(2)
    }
}

#[derive(Clone, Debug)]
pub struct AirlineRegistry {
    airlines: BTreeMap<Address, Airline>,
    registered: usize,
    genesis: Address,
}

impl AirlineRegistry {
    /// Registry holding exactly one registered airline with zero votes.
    pub fn with_genesis(id: Address, name: impl Into<String>) -> Self {
        let mut genesis = Airline::proposed(id, name.into());
        genesis.registered = true;

        let mut airlines = BTreeMap::new();
        airlines.insert(id, genesis);
        Self {
            airlines,
            registered: 1,
            genesis: id,
        }
    }

    pub fn genesis(&self) -> Address {
        self.genesis
    }

    pub fn get(&self, id: &Address) -> Option<&Airline> {
        self.airlines.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &Address) -> Option<&mut Airline> {
        self.airlines.get_mut(id)
    }

    pub fn summary(&self, id: &Address) -> LedgerResult<AirlineSummary> {
        self.get(id)
            .map(AirlineSummary::from)
            .ok_or_else(|| LedgerError::airline_not_found(*id))
    }

    pub fn registered_count(&self) -> usize {
        self.registered
    }

    pub fn iter(&self) -> impl Iterator<Item = &Airline> {
        self.airlines.values()
    }

    /// A registered airline whose capital meets the minimum.
    ///
    /// Unknown or unregistered → `Unauthorized`; registered but short of
    /// capital → `InsufficientFunds`.
    pub fn require_member(
        &self,
        id: Address,
        funding: &FundingLedger,
        action: &'static str,
    ) -> LedgerResult<&Airline> {
        let airline = self
            .get(&id)
            .filter(|a| a.registered)
            .ok_or(LedgerError::Unauthorized { caller: id, action })?;

        if !funding.is_funded(airline) {
            return Err(LedgerError::InsufficientFunds {
                airline: id,
                funded: airline.funded_amount,
                required: funding.minimum(),
            });
        }
        Ok(airline)
    }

    pub fn propose(
        &mut self,
        proposer: Address,
        candidate: Address,
        name: &str,
        funding: &FundingLedger,
    ) -> LedgerResult<()> {
        self.require_member(proposer, funding, "propose airlines")?;

        if self.airlines.contains_key(&candidate) {
            return Err(LedgerError::AlreadyExists {
                what: "airline",
                address: candidate,
            });
        }
        if candidate.is_zero() {
            return Err(LedgerError::out_of_range("airline address must not be zero"));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::out_of_range("airline name must not be empty"));
        }

        self.airlines
            .insert(candidate, Airline::proposed(candidate, name.to_string()));
        tracing::debug!(proposer = %proposer, airline = %candidate, name, "Airline proposed");
        Ok(())
    }

    pub fn vote(
        &mut self,
        voter: Address,
        candidate: Address,
        funding: &FundingLedger,
        bootstrap: usize,
    ) -> LedgerResult<VoteOutcome> {
        self.require_member(voter, funding, "vote")?;

        let current_registered = self.registered;
        let Some(airline) = self.airlines.get_mut(&candidate) else {
            return Err(LedgerError::InvalidState {
                reason: format!("airline {candidate} has not been proposed"),
            });
        };

        if airline.registered {
            return Err(LedgerError::InvalidState {
                reason: format!("airline {candidate} is already registered"),
            });
        }
        if !airline.voters.insert(voter) {
            return Err(LedgerError::DuplicateVote { voter, candidate });
        }
        airline.vote_count += 1;

        let threshold = admission_threshold(current_registered, bootstrap);
        let newly_registered = airline.vote_count as usize >= threshold;
        if newly_registered {
            airline.registered = true;
            self.registered += 1;
        }

        Ok(VoteOutcome {
            votes: airline.vote_count,
            threshold,
            newly_registered,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ether;

    const BOOTSTRAP: usize = 4;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    /// Registry whose genesis airline (1) is funded.
    fn funded_registry() -> (AirlineRegistry, FundingLedger) {
        let mut registry = AirlineRegistry::with_genesis(addr(1), "First Airline");
        let mut funding = FundingLedger::new(ether(10));
        funding.commit(&mut registry, addr(1), ether(10));
        (registry, funding)
    }

    /// Propose, admit with one vote from `sponsor`, and fund.
    fn admit(
        registry: &mut AirlineRegistry,
        funding: &mut FundingLedger,
        sponsor: Address,
        id: Address,
    ) {
        registry.propose(sponsor, id, "Airline", funding).unwrap();
        let outcome = registry.vote(sponsor, id, funding, BOOTSTRAP).unwrap();
        assert!(outcome.newly_registered);
        funding.commit(registry, id, ether(10));
    }

    #[test]
    fn test_threshold_table() {
        assert_eq!(admission_threshold(1, BOOTSTRAP), 1);
        assert_eq!(admission_threshold(3, BOOTSTRAP), 1);
        assert_eq!(admission_threshold(4, BOOTSTRAP), 2);
        assert_eq!(admission_threshold(5, BOOTSTRAP), 3);
        assert_eq!(admission_threshold(6, BOOTSTRAP), 3);
        assert_eq!(admission_threshold(7, BOOTSTRAP), 4);
    }

    #[test]
    fn test_genesis_is_registered_without_votes() {
        let registry = AirlineRegistry::with_genesis(addr(1), "First Airline");
        let genesis = registry.get(&addr(1)).unwrap();
        assert!(genesis.registered);
        assert_eq!(genesis.vote_count, 0);
        assert_eq!(genesis.funded_amount, 0);
        assert_eq!(registry.registered_count(), 1);
    }

    #[test]
    fn test_unfunded_member_cannot_propose() {
        let mut registry = AirlineRegistry::with_genesis(addr(1), "First Airline");
        let funding = FundingLedger::new(ether(10));
        let err = registry
            .propose(addr(1), addr(2), "Second Airline", &funding)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert!(registry.get(&addr(2)).is_none());
    }

    #[test]
    fn test_unknown_proposer_unauthorized() {
        let (mut registry, funding) = funded_registry();
        let err = registry
            .propose(addr(50), addr(2), "Second Airline", &funding)
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized { .. }));
    }

    #[test]
    fn test_duplicate_proposal() {
        let (mut registry, funding) = funded_registry();
        registry.propose(addr(1), addr(2), "Second", &funding).unwrap();
        let err = registry.propose(addr(1), addr(2), "Again", &funding).unwrap_err();
        assert!(matches!(err, LedgerError::AlreadyExists { .. }));
    }

    #[test]
    fn test_proposal_starts_unregistered() {
        let (mut registry, funding) = funded_registry();
        registry.propose(addr(1), addr(2), "Second", &funding).unwrap();
        let summary = registry.summary(&addr(2)).unwrap();
        assert!(!summary.registered);
        assert_eq!(summary.vote_count, 0);
        assert_eq!(summary.funded_amount, 0);
    }

    #[test]
    fn test_bootstrap_single_vote_admits() {
        let (mut registry, mut funding) = funded_registry();
        admit(&mut registry, &mut funding, addr(1), addr(2));
        admit(&mut registry, &mut funding, addr(2), addr(3));
        admit(&mut registry, &mut funding, addr(3), addr(4));
        assert_eq!(registry.registered_count(), 4);
    }

    #[test]
    fn test_majority_required_from_four() {
        let (mut registry, mut funding) = funded_registry();
        admit(&mut registry, &mut funding, addr(1), addr(2));
        admit(&mut registry, &mut funding, addr(2), addr(3));
        admit(&mut registry, &mut funding, addr(3), addr(4));

        registry.propose(addr(4), addr(5), "Fifth", &funding).unwrap();
        let first = registry.vote(addr(4), addr(5), &funding, BOOTSTRAP).unwrap();
        assert_eq!(first.votes, 1);
        assert_eq!(first.threshold, 2);
        assert!(!first.newly_registered);

        let second = registry.vote(addr(3), addr(5), &funding, BOOTSTRAP).unwrap();
        assert!(second.newly_registered);
        assert_eq!(registry.registered_count(), 5);
    }

    #[test]
    fn test_duplicate_vote_rejected() {
        let (mut registry, mut funding) = funded_registry();
        admit(&mut registry, &mut funding, addr(1), addr(2));
        admit(&mut registry, &mut funding, addr(2), addr(3));
        admit(&mut registry, &mut funding, addr(3), addr(4));
        registry.propose(addr(4), addr(5), "Fifth", &funding).unwrap();
        registry.vote(addr(4), addr(5), &funding, BOOTSTRAP).unwrap();

        let err = registry.vote(addr(4), addr(5), &funding, BOOTSTRAP).unwrap_err();
        assert_eq!(
            err,
            LedgerError::DuplicateVote {
                voter: addr(4),
                candidate: addr(5)
            }
        );
        assert_eq!(registry.get(&addr(5)).unwrap().vote_count, 1);
    }

    #[test]
    fn test_vote_on_registered_candidate_is_invalid() {
        let (mut registry, mut funding) = funded_registry();
        admit(&mut registry, &mut funding, addr(1), addr(2));
        let err = registry.vote(addr(2), addr(2), &funding, BOOTSTRAP).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidState { .. }));
    }

    #[test]
    fn test_vote_for_unknown_candidate() {
        let (mut registry, funding) = funded_registry();
        let err = registry.vote(addr(1), addr(77), &funding, BOOTSTRAP).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidState { .. }));
        assert!(registry.get(&addr(77)).is_none());
    }

    #[test]
    fn test_threshold_uses_registered_count_at_vote_time() {
        let (mut registry, mut funding) = funded_registry();
        admit(&mut registry, &mut funding, addr(1), addr(2));
        admit(&mut registry, &mut funding, addr(2), addr(3));
        admit(&mut registry, &mut funding, addr(3), addr(4));

        registry.propose(addr(4), addr(5), "Fifth", &funding).unwrap();
        registry.propose(addr(4), addr(6), "Sixth", &funding).unwrap();
        let early = registry.vote(addr(1), addr(5), &funding, BOOTSTRAP).unwrap();
        assert_eq!(early.threshold, 2);

        registry.vote(addr(1), addr(6), &funding, BOOTSTRAP).unwrap();
        assert!(registry.vote(addr(2), addr(6), &funding, BOOTSTRAP).unwrap().newly_registered);
        assert_eq!(registry.registered_count(), 5);

        // Two votes met the old threshold but not the current one.
        let late = registry.vote(addr(2), addr(5), &funding, BOOTSTRAP).unwrap();
        assert_eq!(late.votes, 2);
        assert_eq!(late.threshold, 3);
        assert!(!late.newly_registered);

        let third = registry.vote(addr(3), addr(5), &funding, BOOTSTRAP).unwrap();
        assert!(third.newly_registered);
    }

    #[test]
    fn test_empty_name_rejected() {
        let (mut registry, funding) = funded_registry();
        let err = registry.propose(addr(1), addr(2), "   ", &funding).unwrap_err();
        assert!(matches!(err, LedgerError::ValueOutOfRange { .. }));
    }
}

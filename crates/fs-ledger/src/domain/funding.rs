//! Funding ledger: airline capital against the minimum-funding threshold.
//!
//! Funding and registration are independent gates. Committing capital never
//! registers an airline, and registration never waives the minimum.

use crate::domain::airline::{Airline, AirlineRegistry};
use crate::error::{LedgerError, LedgerResult};
use shared_types::{Address, Wei};

#[derive(Clone, Debug)]
pub struct FundingLedger {
    minimum: Wei,
    /// Sum of every commitment, across all airlines
    total_committed: Wei,
}

impl FundingLedger {
    pub fn new(minimum: Wei) -> Self {
        Self {
            minimum,
            total_committed: 0,
        }
    }

    pub fn minimum(&self) -> Wei {
        self.minimum
    }

    pub fn total_committed(&self) -> Wei {
        self.total_committed
    }

    pub fn is_funded(&self, airline: &Airline) -> bool {
        airline.funded_amount >= self.minimum
    }

    /// Preconditions for `fund`, checked before any value moves.
    pub fn validate(
        &self,
        registry: &AirlineRegistry,
        airline: Address,
        amount: Wei,
    ) -> LedgerResult<()> {
        if amount == 0 {
            return Err(LedgerError::out_of_range("funding amount must be positive"));
        }
        if registry.get(&airline).is_none() {
            return Err(LedgerError::airline_not_found(airline));
        }
        Ok(())
    }

    /// Record a commitment already validated and deposited. Returns the
    /// airline's new total.
    pub fn commit(&mut self, registry: &mut AirlineRegistry, airline: Address, amount: Wei) -> Wei {
        let Some(entry) = registry.get_mut(&airline) else {
            return 0;
        };
        entry.funded_amount = entry.funded_amount.saturating_add(amount);
        self.total_committed = self.total_committed.saturating_add(amount);
        entry.funded_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::ether;

    fn registry() -> AirlineRegistry {
        AirlineRegistry::with_genesis(Address::from_low_u64(1), "First Airline")
    }

    #[test]
    fn test_zero_amount_rejected() {
        let funding = FundingLedger::new(ether(10));
        let err = funding
            .validate(&registry(), Address::from_low_u64(1), 0)
            .unwrap_err();
        assert!(matches!(err, LedgerError::ValueOutOfRange { .. }));
    }

    #[test]
    fn test_unknown_airline_rejected() {
        let funding = FundingLedger::new(ether(10));
        let err = funding
            .validate(&registry(), Address::from_low_u64(9), ether(1))
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
    }

    #[test]
    fn test_commitments_accumulate_to_threshold() {
        let mut registry = registry();
        let mut funding = FundingLedger::new(ether(10));
        let id = Address::from_low_u64(1);

        assert_eq!(funding.commit(&mut registry, id, ether(4)), ether(4));
        assert!(!funding.is_funded(registry.get(&id).unwrap()));

        assert_eq!(funding.commit(&mut registry, id, ether(6)), ether(10));
        assert!(funding.is_funded(registry.get(&id).unwrap()));
        assert_eq!(funding.total_committed(), ether(10));
    }

    #[test]
    fn test_no_upper_bound() {
        let mut registry = registry();
        let mut funding = FundingLedger::new(ether(10));
        let id = Address::from_low_u64(1);
        assert_eq!(funding.commit(&mut registry, id, ether(500)), ether(500));
    }
}

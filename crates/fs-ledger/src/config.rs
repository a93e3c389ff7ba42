use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use shared_types::{ether, Address, Wei, ETHER};

/// Ledger configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Capital an airline must commit before it may propose, vote or sell
    pub minimum_funding: Wei,
    /// Largest premium accepted for a single policy
    pub max_premium: Wei,
    /// Payout per unit of premium (basis points, 10_000 = 1x)
    pub payout_multiplier_bps: u32,
    /// Fee an oracle pays to register
    pub registration_fee: Wei,
    /// Matching responses required to resolve a status request
    pub min_consensus: usize,
    /// Oracle indexes are drawn from `0..oracle_index_count`
    pub oracle_index_count: u8,
    /// Registered-airline count below which a single vote admits a candidate
    pub bootstrap_airline_count: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            minimum_funding: ether(10),
            max_premium: ETHER,
            payout_multiplier_bps: 15_000, // 1.5x
            registration_fee: ETHER,
            min_consensus: 3,
            oracle_index_count: 10,
            bootstrap_airline_count: 4,
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> LedgerResult<()> {
        let reject = |reason: &str| {
            Err(LedgerError::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        if self.min_consensus == 0 {
            return reject("min_consensus must be at least 1");
        }
        // Each oracle holds three distinct indexes.
        if self.oracle_index_count < 3 {
            return reject("oracle_index_count must be at least 3");
        }
        if self.max_premium == 0 {
            return reject("max_premium must be positive");
        }
        if self.payout_multiplier_bps == 0 {
            return reject("payout_multiplier_bps must be positive");
        }
        if self.bootstrap_airline_count == 0 {
            return reject("bootstrap_airline_count must be at least 1");
        }
        Ok(())
    }

    /// Amount credited for a resolved airline-delay policy.
    #[must_use]
    pub fn payout_for(&self, premium: Wei) -> Wei {
        premium.saturating_mul(Wei::from(self.payout_multiplier_bps)) / 10_000
    }
}

/// State fixed at initialization
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Designated administrator; cannot change after initialization
    pub administrator: Address,
    /// The single airline registered at genesis
    pub airline: Address,
    pub airline_name: String,
}

impl GenesisConfig {
    pub fn new(administrator: Address, airline: Address, airline_name: impl Into<String>) -> Self {
        Self {
            administrator,
            airline,
            airline_name: airline_name.into(),
        }
    }

    pub fn validate(&self) -> LedgerResult<()> {
        if self.airline_name.trim().is_empty() {
            return Err(LedgerError::InvalidConfig {
                reason: "genesis airline name must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

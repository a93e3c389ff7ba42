//! Oracle pool configuration.

use crate::error::{PoolError, PoolResult};
use serde::{Deserialize, Serialize};
use shared_types::{Address, FlightStatus};

/// How the pool picks the status it reports for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusStrategy {
    /// One status drawn uniformly from all codes, per request
    Random,
    /// Always the same status
    Fixed(FlightStatus),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OraclePoolConfig {
    /// Oracles the pool registers and operates
    pub oracle_count: usize,
    /// Oracle addresses are `first_address + i`
    pub first_address: u64,
    pub strategy: StatusStrategy,
}

impl Default for OraclePoolConfig {
    fn default() -> Self {
        Self {
            oracle_count: 20,
            first_address: 0x0a11_0000,
            strategy: StatusStrategy::Random,
        }
    }
}

impl OraclePoolConfig {
    pub fn validate(&self) -> PoolResult<()> {
        if self.oracle_count == 0 {
            return Err(PoolError::InvalidConfig(
                "oracle_count must be at least 1".to_string(),
            ));
        }
        if self.first_address == 0 {
            return Err(PoolError::InvalidConfig(
                "first_address must not be the zero address".to_string(),
            ));
        }
        Ok(())
    }

    /// Addresses of every pool oracle, in registration order.
    pub fn addresses(&self) -> Vec<Address> {
        (0..self.oracle_count as u64)
            .map(|i| Address::from_low_u64(self.first_address + i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OraclePoolConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.addresses().len(), 20);
    }

    #[test]
    fn test_addresses_are_distinct() {
        let config = OraclePoolConfig {
            oracle_count: 5,
            ..OraclePoolConfig::default()
        };
        let mut addresses = config.addresses();
        addresses.dedup();
        assert_eq!(addresses.len(), 5);
        assert!(addresses.iter().all(|a| !a.is_zero()));
    }

    #[test]
    fn test_zero_oracles_rejected() {
        let config = OraclePoolConfig {
            oracle_count: 0,
            ..OraclePoolConfig::default()
        };
        assert!(matches!(config.validate(), Err(PoolError::InvalidConfig(_))));
    }

    #[test]
    fn test_strategy_serde() {
        let fixed = StatusStrategy::Fixed(FlightStatus::LateAirline);
        let json = serde_json::to_string(&fixed).unwrap();
        let back: StatusStrategy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fixed);
    }
}

//! # Node Configuration
//!
//! Defaults for every component, overridable from `FS_*` environment
//! variables. Overrides that fail to parse are logged and ignored.

use fs_ledger::{GenesisConfig, LedgerConfig};
use fs_oracle_pool::{OraclePoolConfig, StatusStrategy};
use fs_telemetry::TelemetryConfig;
use shared_types::{ether, Address, FlightStatus};
use std::str::FromStr;
use tracing::warn;

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub ledger: LedgerConfig,
    pub genesis: GenesisConfig,
    pub oracle_pool: OraclePoolConfig,
    pub telemetry: TelemetryConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            genesis: GenesisConfig::new(
                Address::from_low_u64(0xad),
                Address::from_low_u64(0xa1),
                "FlightSurety Air",
            ),
            oracle_pool: OraclePoolConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl NodeConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.ledger.validate()?;
        self.genesis.validate()?;
        self.oracle_pool.validate()?;
        if self.oracle_pool.addresses().iter().any(|a| {
            *a == self.genesis.administrator || *a == self.genesis.airline
        }) {
            anyhow::bail!("oracle addresses overlap the genesis accounts");
        }
        Ok(())
    }
}

/// Load configuration from the environment.
pub fn load_config() -> NodeConfig {
    let mut config = NodeConfig::default();
    config.telemetry = TelemetryConfig::from_env();
    apply_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Apply `FS_*` overrides looked up through `var`.
pub fn apply_overrides(config: &mut NodeConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(units) = parsed::<u64>(&var, "FS_MIN_FUNDING_ETHER") {
        config.ledger.minimum_funding = ether(units);
    }
    if let Some(units) = parsed::<u64>(&var, "FS_MAX_PREMIUM_ETHER") {
        config.ledger.max_premium = ether(units);
    }
    if let Some(count) = parsed(&var, "FS_MIN_CONSENSUS") {
        config.ledger.min_consensus = count;
    }
    if let Some(count) = parsed(&var, "FS_ORACLE_COUNT") {
        config.oracle_pool.oracle_count = count;
    }
    if let Some(code) = parsed::<u8>(&var, "FS_ORACLE_STATUS") {
        match FlightStatus::try_from(code) {
            Ok(status) => config.oracle_pool.strategy = StatusStrategy::Fixed(status),
            Err(err) => warn!(error = %err, "Ignoring FS_ORACLE_STATUS"),
        }
    }
    if let Some(address) = parsed(&var, "FS_ADMINISTRATOR") {
        config.genesis.administrator = address;
    }
    if let Some(address) = parsed(&var, "FS_GENESIS_AIRLINE") {
        config.genesis.airline = address;
    }
    if let Some(name) = var("FS_GENESIS_AIRLINE_NAME") {
        config.genesis.airline_name = name;
    }
}

fn parsed<T>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = var(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, value = %raw, error = %err, "Ignoring unparsable override");
            None
        }
    }
}

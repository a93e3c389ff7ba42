//! # Core Domain Entities
//!
//! Defines the value types every FlightSurety crate agrees on.
//!
//! ## Clusters
//!
//! - **Identity**: `Address`
//! - **Currency**: `Wei`, `ETHER`
//! - **Flights**: `FlightKey`, `FlightStatus`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 20-byte Ethereum-style address identifying an airline, insuree,
/// oracle or the administrator.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Build an address whose low 8 bytes hold `n` (big-endian).
    ///
    /// Handy for fixtures and simulated account sets.
    #[must_use]
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Address(bytes)
    }

    /// Raw bytes of the address.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Failure to parse an `Address` from hex.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("expected 20 bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(trimmed).map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
        if bytes.len() != 20 {
            return Err(AddressParseError::InvalidLength(bytes.len()));
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

// =============================================================================
// CLUSTER B: CURRENCY
// =============================================================================

/// Amount of currency in base units.
///
/// u128 covers 3.4e20 ETHER, far beyond anything the ledger holds, and keeps
/// arithmetic native.
pub type Wei = u128;

/// One unit of currency expressed in base units.
pub const ETHER: Wei = 1_000_000_000_000_000_000;

/// Convert whole currency units to base units.
#[must_use]
pub const fn ether(units: u64) -> Wei {
    units as Wei * ETHER
}

// =============================================================================
// CLUSTER C: FLIGHTS
// =============================================================================

/// Identifies one flight instance: the operating airline, the flight code and
/// the scheduled departure (unix seconds).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlightKey {
    pub airline: Address,
    pub flight: String,
    pub departure: u64,
}

impl FlightKey {
    pub fn new(airline: Address, flight: impl Into<String>, departure: u64) -> Self {
        Self {
            airline,
            flight: flight.into(),
            departure,
        }
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}/{}", self.flight, self.departure, self.airline)
    }
}

/// Outcome of a flight as reported by oracles.
///
/// The discriminants are the wire status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FlightStatus {
    Unknown = 0,
    OnTime = 10,
    LateAirline = 20,
    LateWeather = 30,
    LateTechnical = 40,
    LateOther = 50,
}

impl FlightStatus {
    /// Every status, in code order.
    pub const ALL: [FlightStatus; 6] = [
        FlightStatus::Unknown,
        FlightStatus::OnTime,
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Only an airline-caused delay pays out.
    #[must_use]
    pub const fn triggers_payout(self) -> bool {
        matches!(self, FlightStatus::LateAirline)
    }
}

/// Status code outside the closed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown flight status code {0}")]
pub struct UnknownStatusCode(pub u8);

impl TryFrom<u8> for FlightStatus {
    type Error = UnknownStatusCode;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        FlightStatus::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(UnknownStatusCode(code))
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlightStatus::Unknown => "UNKNOWN",
            FlightStatus::OnTime => "ON_TIME",
            FlightStatus::LateAirline => "LATE_AIRLINE",
            FlightStatus::LateWeather => "LATE_WEATHER",
            FlightStatus::LateTechnical => "LATE_TECHNICAL",
            FlightStatus::LateOther => "LATE_OTHER",
        };
        write!(f, "{name}({})", self.code())
    }
}

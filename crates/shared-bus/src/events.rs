//! # Ledger Events
//!
//! Defines all event types that flow through the shared bus. Each one records
//! a state transition the ledger has already committed.

use serde::{Deserialize, Serialize};
use shared_types::entities::{Address, FlightKey, FlightStatus, Wei};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    // =========================================================================
    // ACCESS GATE
    // =========================================================================
    /// The operational flag was set by the administrator.
    OperationalStatusChanged { operational: bool },

    /// The administrator granted or revoked a delegated caller.
    CallerAuthorizationChanged { caller: Address, authorized: bool },

    // =========================================================================
    // AIRLINE REGISTRY
    // =========================================================================
    /// A registered, funded airline proposed a new candidate.
    AirlineProposed {
        proposer: Address,
        airline: Address,
        name: String,
    },

    /// A vote for a candidate was recorded.
    AirlineVoted {
        voter: Address,
        airline: Address,
        votes: u32,
    },

    /// A candidate crossed the admission threshold.
    AirlineRegistered { airline: Address, votes: u32 },

    // =========================================================================
    // FUNDING LEDGER
    // =========================================================================
    /// Capital was committed to an airline.
    AirlineFunded {
        airline: Address,
        amount: Wei,
        total: Wei,
    },

    // =========================================================================
    // INSURANCE POLICY BOOK
    // =========================================================================
    /// A passenger bought (or replaced) a policy.
    PolicyPurchased {
        flight: FlightKey,
        insuree: Address,
        premium: Wei,
    },

    /// A resolved policy credited its insuree.
    InsureeCredited {
        flight: FlightKey,
        insuree: Address,
        amount: Wei,
    },

    /// An insuree withdrew everything owed to them.
    InsureeWithdrawn { insuree: Address, amount: Wei },

    // =========================================================================
    // ORACLE CONSENSUS
    // =========================================================================
    /// An oracle paid the fee and received its indexes.
    OracleRegistered { oracle: Address, indexes: [u8; 3] },

    /// A status request was opened; oracles holding `index` should respond.
    OracleRequested { index: u8, flight: FlightKey },

    /// An oracle response was accepted.
    OracleReported {
        oracle: Address,
        index: u8,
        flight: FlightKey,
        status: FlightStatus,
    },

    /// A status request reached quorum and the flight's policies were resolved.
    FlightStatusResolved {
        index: u8,
        flight: FlightKey,
        status: FlightStatus,
    },
}

impl LedgerEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::OperationalStatusChanged { .. } | Self::CallerAuthorizationChanged { .. } => {
                EventTopic::AccessGate
            }
            Self::AirlineProposed { .. }
            | Self::AirlineVoted { .. }
            | Self::AirlineRegistered { .. } => EventTopic::Airlines,
            Self::AirlineFunded { .. } => EventTopic::Funding,
            Self::PolicyPurchased { .. }
            | Self::InsureeCredited { .. }
            | Self::InsureeWithdrawn { .. } => EventTopic::Insurance,
            Self::OracleRegistered { .. }
            | Self::OracleRequested { .. }
            | Self::OracleReported { .. }
            | Self::FlightStatusResolved { .. } => EventTopic::Oracles,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Operational flag and caller delegation.
    AccessGate,
    /// Proposals, votes and admissions.
    Airlines,
    /// Airline capital.
    Funding,
    /// Policies, credits and withdrawals.
    Insurance,
    /// Oracle registration, requests and responses.
    Oracles,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &LedgerEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}

//! # Event Log Handler
//!
//! Mirrors every committed ledger event into the log, the way a dashboard
//! watching the bus would render it.

use shared_bus::{LedgerEvent, Subscription};
use tracing::{debug, info};

pub struct EventLogHandler {
    subscription: Subscription,
}

impl EventLogHandler {
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// Runs until the bus closes. Spawn it and race it against shutdown.
    pub async fn run(mut self) {
        while let Some(event) = self.subscription.recv().await {
            log_event(&event);
        }
        debug!("Event bus closed, event log handler stopping");
    }
}

fn log_event(event: &LedgerEvent) {
    match event {
        LedgerEvent::OperationalStatusChanged { operational } => {
            info!(operational, "Operational status changed");
        }
        LedgerEvent::AirlineRegistered { airline, votes } => {
            info!(%airline, votes, "Airline registered");
        }
        LedgerEvent::AirlineFunded { airline, amount, total } => {
            info!(%airline, amount, total, "Airline funded");
        }
        LedgerEvent::PolicyPurchased { flight, insuree, premium } => {
            info!(%flight, %insuree, premium, "Policy purchased");
        }
        LedgerEvent::OracleRequested { index, flight } => {
            info!(%flight, index, "Flight status requested");
        }
        LedgerEvent::FlightStatusResolved { index, flight, status } => {
            info!(%flight, index, %status, "Flight status resolved");
        }
        LedgerEvent::InsureeCredited { flight, insuree, amount } => {
            info!(%flight, %insuree, amount, "Insuree credited");
        }
        LedgerEvent::InsureeWithdrawn { insuree, amount } => {
            info!(%insuree, amount, "Insuree withdrew");
        }
        other => debug!(topic = ?other.topic(), event = ?other, "Ledger event"),
    }
}

//! # Oracle Pool
//!
//! Listens for `OracleRequested` events on the bus and answers them through
//! the ledger's public surface, as a fleet of independent oracles would.
//!
//! ## Flow
//!
//! ```text
//! Event Bus ──OracleRequested{index, flight}──→ OraclePool
//!                                                  │ pick one status
//!                                                  ▼
//!                                 every pool oracle holding `index`
//!                                                  │ submit_oracle_response
//!                                                  ▼
//!                                              LedgerService
//! ```
//!
//! The pool reports one status per request, so every answering oracle
//! agrees and quorum is reached as soon as enough of them hold the index.

use crate::config::{OraclePoolConfig, StatusStrategy};
use crate::error::{PoolError, PoolResult};
use fs_ledger::{LedgerApi, LedgerError, Oracle};
use rand::seq::SliceRandom;
use shared_bus::{LedgerEvent, Subscription};
use shared_types::{CallContext, FlightKey, FlightStatus};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// What happened when the pool answered one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerReport {
    pub status: FlightStatus,
    /// Responses the ledger accepted
    pub accepted: usize,
    /// Responses turned away because the request had already resolved
    pub late: usize,
    /// Responses rejected for any other reason
    pub failed: usize,
}

pub struct OraclePool<L: LedgerApi> {
    ledger: Arc<L>,
    config: OraclePoolConfig,
    oracles: Vec<Oracle>,
}

impl<L: LedgerApi> OraclePool<L> {
    pub fn new(ledger: Arc<L>, config: OraclePoolConfig) -> PoolResult<Self> {
        config.validate()?;
        Ok(Self {
            ledger,
            config,
            oracles: Vec::new(),
        })
    }

    /// Registered oracles and their indexes.
    pub fn oracles(&self) -> &[Oracle] {
        &self.oracles
    }

    /// Register every configured oracle, paying the ledger's current fee.
    ///
    /// An oracle the ledger already knows is adopted with its existing
    /// indexes, so a restarted pool resumes where it left off.
    pub async fn register_all(&mut self) -> PoolResult<usize> {
        let fee = self.ledger.registration_fee().await;
        let mut oracles = Vec::with_capacity(self.config.oracle_count);

        for address in self.config.addresses() {
            let ctx = CallContext::with_value(address, fee);
            let oracle = match self.ledger.register_oracle(ctx).await {
                Ok(oracle) => oracle,
                Err(LedgerError::AlreadyExists { .. }) => self
                    .ledger
                    .get_oracle(address)
                    .await
                    .map_err(|source| PoolError::Registration {
                        oracle: address,
                        source,
                    })?,
                Err(source) => {
                    return Err(PoolError::Registration {
                        oracle: address,
                        source,
                    })
                }
            };
            debug!(oracle = %address, indexes = ?oracle.indexes, "Oracle ready");
            oracles.push(oracle);
        }

        info!(count = oracles.len(), fee, "Oracle pool registered");
        self.oracles = oracles;
        Ok(self.oracles.len())
    }

    fn pick_status(&self) -> FlightStatus {
        match self.config.strategy {
            StatusStrategy::Fixed(status) => status,
            StatusStrategy::Random => FlightStatus::ALL
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or(FlightStatus::Unknown),
        }
    }

    /// Submit one status for `flight` from every pool oracle holding `index`.
    pub async fn answer(&self, index: u8, flight: &FlightKey) -> AnswerReport {
        let status = self.pick_status();
        let mut report = AnswerReport {
            status,
            accepted: 0,
            late: 0,
            failed: 0,
        };

        for oracle in self.oracles.iter().filter(|o| o.holds(index)) {
            let ctx = CallContext::new(oracle.address);
            match self
                .ledger
                .submit_oracle_response(ctx, index, flight.clone(), status.code())
                .await
            {
                Ok(()) => report.accepted += 1,
                Err(LedgerError::AlreadyResolved { .. }) => {
                    debug!(oracle = %oracle.address, %flight, "Request already resolved");
                    report.late += 1;
                }
                Err(err) => {
                    warn!(oracle = %oracle.address, %flight, error = %err, "Response rejected");
                    report.failed += 1;
                }
            }
        }

        info!(
            %flight,
            index,
            %status,
            accepted = report.accepted,
            late = report.late,
            "Answered status request"
        );
        report
    }

    /// Answer requests until the bus closes or shutdown is signalled.
    pub async fn run(self, mut subscription: Subscription, mut shutdown: watch::Receiver<bool>) {
        info!(oracles = self.oracles.len(), "Oracle pool listening");
        loop {
            tokio::select! {
                event = subscription.recv() => match event {
                    Some(LedgerEvent::OracleRequested { index, flight }) => {
                        self.answer(index, &flight).await;
                    }
                    Some(_) => {}
                    None => {
                        info!("Event bus closed, oracle pool stopping");
                        break;
                    }
                },
                _ = shutdown.changed() => {
                    info!("Shutdown signal received, oracle pool stopping");
                    break;
                }
            }
        }
    }
}

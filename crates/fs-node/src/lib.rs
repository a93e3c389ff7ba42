//! # FlightSurety Node Runtime
//!
//! Wires the ledger to its outbound adapters, starts the oracle pool on the
//! event bus and keeps both running until shutdown.
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Build the ledger with genesis state (administrator, first airline)
//! 3. Fund oracle wallets and register the pool
//! 4. Spawn the pool and the event log handler
//!
//! ```text
//! LedgerService ──EventBusSink──→ InMemoryEventBus ──OracleRequested──→ OraclePool
//!       ↑                                 │                                │
//!       │                                 └──all events──→ EventLogHandler │
//!       └───────────────────submit_oracle_response──────────────────────────┘
//! ```

pub mod config;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use fs_ledger::adapters::{EventBusSink, InMemoryCustody, OsEntropy};
use fs_ledger::{LedgerApi, LedgerDependencies, LedgerService};
use fs_oracle_pool::OraclePool;
use fs_telemetry::component_span;
use parking_lot::Mutex;
use shared_bus::{EventFilter, EventTopic, InMemoryEventBus};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn, Instrument};

pub use crate::config::{apply_overrides, load_config, NodeConfig};
use crate::handlers::EventLogHandler;

/// The ledger as the node runs it.
pub type NodeLedger = LedgerService<InMemoryCustody, OsEntropy, EventBusSink>;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub struct NodeRuntime {
    config: NodeConfig,
    event_bus: Arc<InMemoryEventBus>,
    ledger: Arc<NodeLedger>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl NodeRuntime {
    pub fn new(config: NodeConfig) -> Result<Self> {
        config.validate().context("Invalid node configuration")?;

        let event_bus = Arc::new(InMemoryEventBus::new());
        let custody = Arc::new(InMemoryCustody::new());
        for oracle in config.oracle_pool.addresses() {
            custody.fund_wallet(oracle, config.ledger.registration_fee);
        }

        let ledger = LedgerService::new(LedgerDependencies {
            custody,
            entropy: Arc::new(OsEntropy),
            events: Arc::new(EventBusSink::new(Arc::clone(&event_bus))),
            config: config.ledger.clone(),
            genesis: config.genesis.clone(),
        })
        .context("Failed to initialize ledger")?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            event_bus,
            ledger: Arc::new(ledger),
            tasks: Mutex::new(Vec::new()),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Register the oracle pool and spawn the background handlers.
    pub async fn start(&self) -> Result<()> {
        info!("===========================================");
        info!("  FlightSurety Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let mut pool = OraclePool::new(Arc::clone(&self.ledger), self.config.oracle_pool.clone())
            .context("Invalid oracle pool configuration")?;
        pool.register_all()
            .instrument(component_span!("oracle_pool"))
            .await
            .context("Failed to register oracle pool")?;

        // Subscribe before spawning so no request published after start is missed
        let requests = self
            .event_bus
            .subscribe(EventFilter::topics(vec![EventTopic::Oracles]));
        let pool_task = tokio::spawn(
            pool.run(requests, self.shutdown_rx.clone())
                .instrument(component_span!("oracle_pool")),
        );

        let log_handler = EventLogHandler::new(self.event_bus.subscribe(EventFilter::all()));
        let mut log_shutdown = self.shutdown_rx.clone();
        let log_task = tokio::spawn(
            async move {
                tokio::select! {
                    _ = log_handler.run() => {}
                    _ = log_shutdown.changed() => {}
                }
            }
            .instrument(component_span!("event_log")),
        );

        self.tasks.lock().extend([pool_task, log_task]);

        let operational = self.ledger.is_operational().await;
        info!(
            administrator = %self.config.genesis.administrator,
            airline = %self.config.genesis.airline,
            oracles = self.config.oracle_pool.oracle_count,
            operational,
            "FlightSurety node running"
        );
        Ok(())
    }

    /// Signal every handler to stop and wait for them, up to a grace period.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "Handler task failed"),
                Err(_) => warn!("Handler did not stop within the grace period"),
            }
        }

        info!("Shutdown complete");
    }

    pub fn ledger(&self) -> Arc<NodeLedger> {
        Arc::clone(&self.ledger)
    }

    pub fn event_bus(&self) -> Arc<InMemoryEventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
}

//! # Test Harness
//!
//! A ledger publishing onto a real bus, with an oracle pool listening on it.
//! Entropy is fixed so oracle indexes are reproducible between runs.

use std::sync::Arc;
use std::time::Duration;

use fs_ledger::adapters::{EventBusSink, FixedEntropy, InMemoryCustody};
use fs_ledger::{GenesisConfig, LedgerApi, LedgerConfig, LedgerDependencies, LedgerService};
use fs_oracle_pool::{OraclePool, OraclePoolConfig, StatusStrategy};
use shared_bus::{EventFilter, EventTopic, InMemoryEventBus, LedgerEvent, Subscription};
use shared_types::{ether, Address, CallContext, FlightKey, FlightStatus};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;

pub type HarnessLedger = LedgerService<InMemoryCustody, FixedEntropy, EventBusSink>;

pub const ADMIN: u64 = 1;
pub const GENESIS: u64 = 10;
pub const PASSENGER: u64 = 100;
pub const ORACLE_BASE: u64 = 5_000;
pub const POOL_SIZE: usize = 30;

pub fn addr(n: u64) -> Address {
    Address::from_low_u64(n)
}

pub fn ctx(n: u64) -> CallContext {
    CallContext::new(addr(n))
}

pub fn paying(n: u64, value: u128) -> CallContext {
    CallContext::with_value(addr(n), value)
}

pub fn flight(airline: u64, code: &str) -> FlightKey {
    FlightKey::new(addr(airline), code, 1_700_000_000)
}

pub struct Harness {
    pub bus: Arc<InMemoryEventBus>,
    pub ledger: Arc<HarnessLedger>,
    shutdown_tx: watch::Sender<bool>,
    pool_task: Option<JoinHandle<()>>,
}

impl Harness {
    /// Ledger and bus only; no pool is listening.
    pub fn new() -> Self {
        let bus = Arc::new(InMemoryEventBus::new());
        let custody = Arc::new(InMemoryCustody::new());
        for n in [GENESIS, PASSENGER] {
            custody.fund_wallet(addr(n), ether(1_000));
        }
        for n in GENESIS + 1..GENESIS + 10 {
            custody.fund_wallet(addr(n), ether(100));
        }

        let ledger = LedgerService::new(LedgerDependencies {
            custody,
            entropy: Arc::new(FixedEntropy([42u8; 32])),
            events: Arc::new(EventBusSink::new(Arc::clone(&bus))),
            config: LedgerConfig::default(),
            genesis: GenesisConfig::new(addr(ADMIN), addr(GENESIS), "Genesis Air"),
        })
        .unwrap();

        let (shutdown_tx, _) = watch::channel(false);
        Self {
            bus,
            ledger: Arc::new(ledger),
            shutdown_tx,
            pool_task: None,
        }
    }

    /// Ledger, bus and a running oracle pool reporting with `strategy`.
    pub async fn with_pool(strategy: StatusStrategy) -> Self {
        let mut harness = Self::new();
        let config = OraclePoolConfig {
            oracle_count: POOL_SIZE,
            first_address: ORACLE_BASE,
            strategy,
        };
        let fee = harness.ledger.registration_fee().await;
        for oracle in config.addresses() {
            harness.ledger.custody().fund_wallet(oracle, fee);
        }

        let mut pool = OraclePool::new(Arc::clone(&harness.ledger), config).unwrap();
        pool.register_all().await.unwrap();

        let requests = harness
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::Oracles]));
        let shutdown_rx = harness.shutdown_tx.subscribe();
        harness.pool_task = Some(tokio::spawn(pool.run(requests, shutdown_rx)));
        harness
    }

    pub fn subscribe(&self, topic: EventTopic) -> Subscription {
        self.bus.subscribe(EventFilter::topics(vec![topic]))
    }

    pub async fn fund(&self, airline: u64) {
        self.ledger
            .fund(paying(airline, ether(10)), addr(airline))
            .await
            .unwrap();
    }

    /// Propose `candidate` from `sponsor`, then vote from `voters` until it registers.
    pub async fn admit(&self, sponsor: u64, candidate: u64, voters: &[u64]) -> usize {
        self.ledger
            .propose_airline(ctx(sponsor), addr(candidate), format!("Airline {candidate}"))
            .await
            .unwrap();
        for (cast, voter) in voters.iter().enumerate() {
            self.ledger.vote(ctx(*voter), addr(candidate)).await.unwrap();
            if self.ledger.get_airline(addr(candidate)).await.unwrap().registered {
                return cast + 1;
            }
        }
        voters.len()
    }

    /// Request a status for `flight` until the pool resolves it.
    ///
    /// A drawn index may have too few pool oracles to reach quorum, so each
    /// attempt draws a fresh index.
    pub async fn resolve(&self, flight: &FlightKey) -> FlightStatus {
        let mut resolved = self.subscribe(EventTopic::Oracles);
        for _ in 0..10 {
            // An earlier attempt may resolve late; its event is still buffered
            let _ = self
                .ledger
                .fetch_flight_status(ctx(ADMIN), flight.clone())
                .await;
            let wait = async {
                while let Some(event) = resolved.recv().await {
                    if let LedgerEvent::FlightStatusResolved { flight: f, status, .. } = event {
                        if &f == flight {
                            return Some(status);
                        }
                    }
                }
                None
            };
            if let Ok(Some(status)) = timeout(Duration::from_millis(500), wait).await {
                return status;
            }
        }
        panic!("flight {flight} never reached quorum");
    }

    pub async fn stop(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.pool_task.take() {
            timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
        }
    }
}

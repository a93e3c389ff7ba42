//! Ledger Service - the facade every external call goes through
//!
//! # Architecture
//! - One `parking_lot::Mutex<LedgerStore>`, held for the whole of each call
//! - Custody and entropy are called under the lock; event publication after it
//! - An async publish gate keeps batches in commit order
//! - Events of a rejected call are discarded, never published

use crate::config::{GenesisConfig, LedgerConfig};
use crate::domain::invariants::{check_all_invariants, InvariantCheckResult};
use crate::domain::{AirlineSummary, LedgerStore, Oracle, Policy, StatusRequestSummary};
use crate::error::{LedgerError, LedgerResult};
use crate::ports::{EntropySource, LedgerApi, LedgerEventSink, ValueCustody};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Address, CallContext, FlightKey, FlightStatus, Wei};
use std::sync::Arc;
use tracing::{debug, warn};

/// Dependencies for LedgerService
pub struct LedgerDependencies<C, E, S> {
    pub custody: Arc<C>,
    pub entropy: Arc<E>,
    pub events: Arc<S>,
    pub config: LedgerConfig,
    pub genesis: GenesisConfig,
}

pub struct LedgerService<C, E, S>
where
    C: ValueCustody,
    E: EntropySource,
    S: LedgerEventSink,
{
    store: Mutex<LedgerStore>,
    /// Held from apply through publish
    publish_gate: tokio::sync::Mutex<()>,
    custody: Arc<C>,
    entropy: Arc<E>,
    events: Arc<S>,
}

impl<C, E, S> LedgerService<C, E, S>
where
    C: ValueCustody,
    E: EntropySource,
    S: LedgerEventSink,
{
    /// Build the store and seed the genesis airline.
    pub fn new(deps: LedgerDependencies<C, E, S>) -> LedgerResult<Self> {
        let store = LedgerStore::new(deps.config, deps.genesis)?;
        Ok(Self {
            store: Mutex::new(store),
            publish_gate: tokio::sync::Mutex::new(()),
            custody: deps.custody,
            entropy: deps.entropy,
            events: deps.events,
        })
    }

    pub fn custody(&self) -> &Arc<C> {
        &self.custody
    }

    pub fn config(&self) -> LedgerConfig {
        self.store.lock().config().clone()
    }

    /// Run a read against a consistent snapshot of the store.
    pub fn inspect<R>(&self, f: impl FnOnce(&LedgerStore) -> R) -> R {
        f(&self.store.lock())
    }

    pub fn check_invariants(&self) -> InvariantCheckResult {
        let store = self.store.lock();
        check_all_invariants(&*store, self.custody.held())
    }

    /// Apply one mutating operation atomically, then publish what it emitted.
    async fn commit<T, F>(&self, operation: &'static str, apply: F) -> LedgerResult<T>
    where
        T: Send,
        F: FnOnce(&mut LedgerStore, &C, &E) -> LedgerResult<T> + Send,
    {
        let _ordered = self.publish_gate.lock().await;
        let (result, events) = {
            let mut store = self.store.lock();
            let result = apply(&mut *store, self.custody.as_ref(), self.entropy.as_ref());
            (result, store.take_events())
        };

        match &result {
            Ok(_) => {}
            Err(err @ LedgerError::Unauthorized { .. }) => {
                warn!(operation, error = %err, "Privileged call rejected");
            }
            Err(err) => debug!(operation, error = %err, "Call rejected"),
        }

        if result.is_ok() {
            self.events.publish(events).await;
        }
        result
    }
}

#[async_trait]
impl<C, E, S> LedgerApi for LedgerService<C, E, S>
where
    C: ValueCustody + 'static,
    E: EntropySource + 'static,
    S: LedgerEventSink + 'static,
{
    async fn is_operational(&self) -> bool {
        self.store.lock().gate().is_operational()
    }

    async fn set_operational(&self, ctx: CallContext, operational: bool) -> LedgerResult<()> {
        self.commit("set_operational", move |store, _, _| {
            store.set_operational(ctx, operational)
        })
        .await
    }

    async fn authorize_caller(&self, ctx: CallContext, delegate: Address) -> LedgerResult<()> {
        self.commit("authorize_caller", move |store, _, _| {
            store.authorize_caller(ctx, delegate)
        })
        .await
    }

    async fn deauthorize_caller(&self, ctx: CallContext, delegate: Address) -> LedgerResult<()> {
        self.commit("deauthorize_caller", move |store, _, _| {
            store.deauthorize_caller(ctx, delegate)
        })
        .await
    }

    async fn is_authorized_caller(&self, address: Address) -> bool {
        self.store.lock().gate().is_authorized(&address)
    }

    async fn get_airline(&self, id: Address) -> LedgerResult<AirlineSummary> {
        self.store.lock().airline(&id)
    }

    async fn is_airline_funded(&self, id: Address) -> LedgerResult<bool> {
        self.store.lock().is_funded(&id)
    }

    async fn propose_airline(
        &self,
        ctx: CallContext,
        candidate: Address,
        name: String,
    ) -> LedgerResult<()> {
        self.commit("propose_airline", move |store, _, _| {
            store.propose_airline(ctx, candidate, &name)
        })
        .await
    }

    async fn vote(&self, ctx: CallContext, candidate: Address) -> LedgerResult<()> {
        self.commit("vote", move |store, _, _| store.vote(ctx, candidate))
            .await
    }

    async fn fund(&self, ctx: CallContext, airline: Address) -> LedgerResult<()> {
        self.commit("fund", move |store, custody, _| {
            store.fund(ctx, airline, custody)
        })
        .await
    }

    async fn buy(&self, ctx: CallContext, flight: FlightKey) -> LedgerResult<()> {
        self.commit("buy", move |store, custody, _| store.buy(ctx, flight, custody))
            .await
    }

    async fn withdraw(&self, ctx: CallContext) -> LedgerResult<Wei> {
        self.commit("withdraw", move |store, custody, _| {
            store.withdraw(ctx, custody)
        })
        .await
    }

    async fn get_insuree_balance(&self, insuree: Address) -> Wei {
        self.store.lock().insuree_balance(&insuree)
    }

    async fn get_policy(&self, flight: FlightKey, insuree: Address) -> LedgerResult<Policy> {
        self.store.lock().policy(&flight, &insuree)
    }

    async fn registration_fee(&self) -> Wei {
        self.store.lock().config().registration_fee
    }

    async fn register_oracle(&self, ctx: CallContext) -> LedgerResult<Oracle> {
        self.commit("register_oracle", move |store, custody, entropy| {
            store.register_oracle(ctx, &entropy.entropy(), custody)
        })
        .await
    }

    async fn get_oracle(&self, address: Address) -> LedgerResult<Oracle> {
        self.store.lock().oracle(&address)
    }

    async fn fetch_flight_status(&self, ctx: CallContext, flight: FlightKey) -> LedgerResult<u8> {
        self.commit("fetch_flight_status", move |store, _, entropy| {
            store.fetch_flight_status(ctx, flight, &entropy.entropy())
        })
        .await
    }

    async fn submit_oracle_response(
        &self,
        ctx: CallContext,
        index: u8,
        flight: FlightKey,
        status_code: u8,
    ) -> LedgerResult<()> {
        self.commit("submit_oracle_response", move |store, _, _| {
            store.submit_oracle_response(ctx, index, flight, status_code)
        })
        .await
    }

    async fn get_flight_status(&self, flight: FlightKey) -> Option<FlightStatus> {
        self.store.lock().flight_status(&flight)
    }

    async fn get_status_request(
        &self,
        flight: FlightKey,
        index: u8,
    ) -> LedgerResult<StatusRequestSummary> {
        self.store.lock().status_request(&flight, index)
    }
}

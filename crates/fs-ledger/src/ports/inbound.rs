//! Driving ports (API - inbound)
//!
//! Every mutating call carries the `CallContext` the execution environment
//! attached to it. The caller is never read from the payload.

use crate::domain::{AirlineSummary, Oracle, Policy, StatusRequestSummary};
use crate::error::LedgerResult;
use async_trait::async_trait;
use shared_types::{Address, CallContext, FlightKey, FlightStatus, Wei};

/// Public operation surface of the ledger.
///
/// Calls are serialized: each one runs to completion against the store
/// before the next begins, and a rejected call changes nothing.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    // --- access gate ---------------------------------------------------------

    /// Never gated.
    async fn is_operational(&self) -> bool;

    /// Administrator only; allowed while not operational.
    async fn set_operational(&self, ctx: CallContext, operational: bool) -> LedgerResult<()>;

    /// Administrator only. Delegates may request flight statuses.
    async fn authorize_caller(&self, ctx: CallContext, delegate: Address) -> LedgerResult<()>;

    async fn deauthorize_caller(&self, ctx: CallContext, delegate: Address) -> LedgerResult<()>;

    async fn is_authorized_caller(&self, address: Address) -> bool;

    // --- airlines and funding ------------------------------------------------

    async fn get_airline(&self, id: Address) -> LedgerResult<AirlineSummary>;

    async fn is_airline_funded(&self, id: Address) -> LedgerResult<bool>;

    /// Caller must be a registered, funded airline.
    async fn propose_airline(
        &self,
        ctx: CallContext,
        candidate: Address,
        name: String,
    ) -> LedgerResult<()>;

    /// Caller must be a registered, funded airline.
    async fn vote(&self, ctx: CallContext, candidate: Address) -> LedgerResult<()>;

    /// Commits `ctx.value` to `airline`.
    async fn fund(&self, ctx: CallContext, airline: Address) -> LedgerResult<()>;

    // --- insurance -----------------------------------------------------------

    /// Caller is the insuree; `ctx.value` is the premium.
    async fn buy(&self, ctx: CallContext, flight: FlightKey) -> LedgerResult<()>;

    /// Pays out the caller's whole balance and returns the amount.
    async fn withdraw(&self, ctx: CallContext) -> LedgerResult<Wei>;

    async fn get_insuree_balance(&self, insuree: Address) -> Wei;

    async fn get_policy(&self, flight: FlightKey, insuree: Address) -> LedgerResult<Policy>;

    // --- oracles -------------------------------------------------------------

    async fn registration_fee(&self) -> Wei;

    /// `ctx.value` is the fee. Returns the assigned indexes.
    async fn register_oracle(&self, ctx: CallContext) -> LedgerResult<Oracle>;

    async fn get_oracle(&self, address: Address) -> LedgerResult<Oracle>;

    /// Administrator or delegate only. Returns the index oracles must answer on.
    async fn fetch_flight_status(&self, ctx: CallContext, flight: FlightKey) -> LedgerResult<u8>;

    async fn submit_oracle_response(
        &self,
        ctx: CallContext,
        index: u8,
        flight: FlightKey,
        status_code: u8,
    ) -> LedgerResult<()>;

    /// Status of the most recent resolution for the flight.
    async fn get_flight_status(&self, flight: FlightKey) -> Option<FlightStatus>;

    async fn get_status_request(
        &self,
        flight: FlightKey,
        index: u8,
    ) -> LedgerResult<StatusRequestSummary>;
}

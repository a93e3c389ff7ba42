//! The single owned ledger store.
//!
//! Every component lives here and is mutated only through the operations
//! below. Each operation checks all of its preconditions first, then moves
//! value through custody, then mutates. A failed operation leaves the store
//! exactly as it found it and buffers no events.

use crate::config::{GenesisConfig, LedgerConfig};
use crate::domain::access_gate::AccessGate;
use crate::domain::airline::{AirlineRegistry, AirlineSummary};
use crate::domain::funding::FundingLedger;
use crate::domain::oracle::{Oracle, OracleConsensus, StatusRequestSummary};
use crate::domain::policy::{Policy, PolicyBook, PremiumSettlement};
use crate::error::{LedgerError, LedgerResult};
use crate::ports::outbound::ValueCustody;
use shared_bus::LedgerEvent;
use shared_types::{Address, CallContext, FlightKey, FlightStatus, Wei};
use tracing::info;

pub struct LedgerStore {
    config: LedgerConfig,
    gate: AccessGate,
    airlines: AirlineRegistry,
    funding: FundingLedger,
    policies: PolicyBook,
    oracles: OracleConsensus,
    /// Events of committed operations, drained by the service
    pending_events: Vec<LedgerEvent>,
}

impl LedgerStore {
    pub fn new(config: LedgerConfig, genesis: GenesisConfig) -> LedgerResult<Self> {
        config.validate()?;
        genesis.validate()?;

        Ok(Self {
            gate: AccessGate::new(genesis.administrator),
            airlines: AirlineRegistry::with_genesis(genesis.airline, genesis.airline_name),
            funding: FundingLedger::new(config.minimum_funding),
            policies: PolicyBook::new(),
            oracles: OracleConsensus::new(config.min_consensus, config.oracle_index_count),
            pending_events: Vec::new(),
            config,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }

    pub fn airlines(&self) -> &AirlineRegistry {
        &self.airlines
    }

    pub fn funding(&self) -> &FundingLedger {
        &self.funding
    }

    pub fn policies(&self) -> &PolicyBook {
        &self.policies
    }

    pub fn oracles(&self) -> &OracleConsensus {
        &self.oracles
    }

    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn emit(&mut self, event: LedgerEvent) {
        self.pending_events.push(event);
    }

    // =========================================================================
    // ACCESS GATE
    // =========================================================================

    pub fn set_operational(&mut self, ctx: CallContext, operational: bool) -> LedgerResult<()> {
        if self.gate.set_operational(ctx.caller, operational)? {
            info!(operational, "Operational status changed");
            self.emit(LedgerEvent::OperationalStatusChanged { operational });
        }
        Ok(())
    }

    pub fn authorize_caller(&mut self, ctx: CallContext, delegate: Address) -> LedgerResult<()> {
        if self.gate.authorize(ctx.caller, delegate)? {
            info!(caller = %delegate, "Caller authorized");
            self.emit(LedgerEvent::CallerAuthorizationChanged {
                caller: delegate,
                authorized: true,
            });
        }
        Ok(())
    }

    pub fn deauthorize_caller(&mut self, ctx: CallContext, delegate: Address) -> LedgerResult<()> {
        if self.gate.deauthorize(ctx.caller, delegate)? {
            info!(caller = %delegate, "Caller deauthorized");
            self.emit(LedgerEvent::CallerAuthorizationChanged {
                caller: delegate,
                authorized: false,
            });
        }
        Ok(())
    }

    // =========================================================================
    // AIRLINE REGISTRY
    // =========================================================================

    pub fn airline(&self, id: &Address) -> LedgerResult<AirlineSummary> {
        self.airlines.summary(id)
    }

    pub fn propose_airline(
        &mut self,
        ctx: CallContext,
        candidate: Address,
        name: &str,
    ) -> LedgerResult<()> {
        self.gate.require_operational()?;
        self.airlines
            .propose(ctx.caller, candidate, name, &self.funding)?;

        self.emit(LedgerEvent::AirlineProposed {
            proposer: ctx.caller,
            airline: candidate,
            name: name.trim().to_string(),
        });
        Ok(())
    }

    pub fn vote(&mut self, ctx: CallContext, candidate: Address) -> LedgerResult<()> {
        self.gate.require_operational()?;
        let outcome = self.airlines.vote(
            ctx.caller,
            candidate,
            &self.funding,
            self.config.bootstrap_airline_count,
        )?;

        tracing::debug!(
            voter = %ctx.caller,
            airline = %candidate,
            votes = outcome.votes,
            threshold = outcome.threshold,
            "Vote recorded"
        );
        self.emit(LedgerEvent::AirlineVoted {
            voter: ctx.caller,
            airline: candidate,
            votes: outcome.votes,
        });

        if outcome.newly_registered {
            info!(
                airline = %candidate,
                votes = outcome.votes,
                registered = self.airlines.registered_count(),
                "Airline registered"
            );
            self.emit(LedgerEvent::AirlineRegistered {
                airline: candidate,
                votes: outcome.votes,
            });
        }
        Ok(())
    }

    // =========================================================================
    // FUNDING LEDGER
    // =========================================================================

    pub fn is_funded(&self, id: &Address) -> LedgerResult<bool> {
        self.airlines
            .get(id)
            .map(|airline| self.funding.is_funded(airline))
            .ok_or_else(|| LedgerError::airline_not_found(*id))
    }

    pub fn fund(
        &mut self,
        ctx: CallContext,
        airline: Address,
        custody: &dyn ValueCustody,
    ) -> LedgerResult<()> {
        self.gate.require_operational()?;
        self.funding.validate(&self.airlines, airline, ctx.value)?;
        custody.deposit(ctx.caller, ctx.value)?;

        let total = self.funding.commit(&mut self.airlines, airline, ctx.value);
        info!(airline = %airline, amount = ctx.value, total, "Airline funded");
        self.emit(LedgerEvent::AirlineFunded {
            airline,
            amount: ctx.value,
            total,
        });
        Ok(())
    }

    // =========================================================================
    // INSURANCE POLICY BOOK
    // =========================================================================

    pub fn policy(&self, flight: &FlightKey, insuree: &Address) -> LedgerResult<Policy> {
        self.policies
            .get(flight, insuree)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound {
                what: "policy",
                key: format!("{flight} insuree {insuree}"),
            })
    }

    pub fn insuree_balance(&self, insuree: &Address) -> Wei {
        self.policies.balance_of(insuree)
    }

    /// Buy (or replace) the caller's policy on `flight`. The premium is the
    /// value the caller attaches.
    pub fn buy(
        &mut self,
        ctx: CallContext,
        flight: FlightKey,
        custody: &dyn ValueCustody,
    ) -> LedgerResult<()> {
        self.gate.require_operational()?;

        let eligible = self
            .airlines
            .get(&flight.airline)
            .is_some_and(|a| a.registered && self.funding.is_funded(a));
        if !eligible {
            return Err(LedgerError::AirlineNotEligible {
                airline: flight.airline,
            });
        }
        if flight.flight.trim().is_empty() {
            return Err(LedgerError::out_of_range("flight code must not be empty"));
        }

        let premium = ctx.value;
        match self.policies.quote_purchase(
            &flight,
            &ctx.caller,
            premium,
            self.config.max_premium,
        )? {
            PremiumSettlement::Deposit(amount) => custody.deposit(ctx.caller, amount)?,
            PremiumSettlement::Refund(amount) => custody.release(ctx.caller, amount)?,
            PremiumSettlement::Unchanged => {}
        }

        self.policies
            .record_purchase(flight.clone(), ctx.caller, premium);
        info!(flight = %flight, insuree = %ctx.caller, premium, "Policy purchased");
        self.emit(LedgerEvent::PolicyPurchased {
            flight,
            insuree: ctx.caller,
            premium,
        });
        Ok(())
    }

    /// Pay out everything owed to the caller.
    ///
    /// The balance is zeroed before custody releases anything. A failed
    /// release puts the balance back.
    pub fn withdraw(&mut self, ctx: CallContext, custody: &dyn ValueCustody) -> LedgerResult<Wei> {
        self.gate.require_operational()?;
        let amount = self.policies.take_balance(ctx.caller)?;

        if let Err(err) = custody.release(ctx.caller, amount) {
            self.policies.restore_balance(ctx.caller, amount);
            tracing::warn!(insuree = %ctx.caller, amount, error = %err, "Withdrawal release failed");
            return Err(err.into());
        }

        info!(insuree = %ctx.caller, amount, "Insuree withdrew");
        self.emit(LedgerEvent::InsureeWithdrawn {
            insuree: ctx.caller,
            amount,
        });
        Ok(amount)
    }

    // =========================================================================
    // ORACLE CONSENSUS
    // =========================================================================

    pub fn oracle(&self, address: &Address) -> LedgerResult<Oracle> {
        self.oracles
            .oracle(address)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound {
                what: "oracle",
                key: address.to_string(),
            })
    }

    pub fn status_request(
        &self,
        flight: &FlightKey,
        index: u8,
    ) -> LedgerResult<StatusRequestSummary> {
        self.oracles
            .request(flight, index)
            .map(StatusRequestSummary::from)
            .ok_or_else(|| LedgerError::RequestNotFound {
                flight: flight.clone(),
                index,
            })
    }

    pub fn flight_status(&self, flight: &FlightKey) -> Option<FlightStatus> {
        self.oracles.flight_status(flight)
    }

    pub fn register_oracle(
        &mut self,
        ctx: CallContext,
        entropy: &[u8; 32],
        custody: &dyn ValueCustody,
    ) -> LedgerResult<Oracle> {
        self.gate.require_operational()?;
        let admission = self.oracles.admit(
            ctx.caller,
            ctx.value,
            self.config.registration_fee,
            entropy,
        )?;
        custody.deposit(ctx.caller, ctx.value)?;

        let oracle = self.oracles.register(admission);
        info!(oracle = %oracle.address, indexes = ?oracle.indexes, "Oracle registered");
        self.emit(LedgerEvent::OracleRegistered {
            oracle: oracle.address,
            indexes: oracle.indexes,
        });
        Ok(oracle)
    }

    /// Open a status request and announce it to the oracle pool. Returns the
    /// drawn index.
    pub fn fetch_flight_status(
        &mut self,
        ctx: CallContext,
        flight: FlightKey,
        entropy: &[u8; 32],
    ) -> LedgerResult<u8> {
        self.gate.require_operational()?;
        self.gate
            .require_privileged(ctx.caller, "request flight status")?;
        if self.airlines.get(&flight.airline).is_none() {
            return Err(LedgerError::airline_not_found(flight.airline));
        }

        let opened = self.oracles.fetch(ctx.caller, flight.clone(), entropy);
        info!(
            flight = %flight,
            index = opened.index,
            created = opened.created,
            "Flight status requested"
        );
        self.emit(LedgerEvent::OracleRequested {
            index: opened.index,
            flight,
        });
        Ok(opened.index)
    }

    pub fn submit_oracle_response(
        &mut self,
        ctx: CallContext,
        index: u8,
        flight: FlightKey,
        status_code: u8,
    ) -> LedgerResult<()> {
        self.gate.require_operational()?;
        let status = FlightStatus::try_from(status_code)?;

        let config = &self.config;
        let outcome = self.oracles.submit(
            ctx.caller,
            index,
            &flight,
            status,
            &mut self.policies,
            |premium| config.payout_for(premium),
        )?;

        tracing::debug!(
            oracle = %ctx.caller,
            flight = %flight,
            index,
            status = %status,
            matching = outcome.matching,
            "Oracle response recorded"
        );
        self.emit(LedgerEvent::OracleReported {
            oracle: ctx.caller,
            index,
            flight: flight.clone(),
            status,
        });

        if let Some(resolved) = outcome.resolved {
            for credit in outcome.credits {
                info!(insuree = %credit.insuree, amount = credit.amount, "Insuree credited");
                self.emit(LedgerEvent::InsureeCredited {
                    flight: flight.clone(),
                    insuree: credit.insuree,
                    amount: credit.amount,
                });
            }
            self.emit(LedgerEvent::FlightStatusResolved {
                index,
                flight,
                status: resolved,
            });
        }
        Ok(())
    }
}

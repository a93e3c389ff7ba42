//! Insurance policy book: premium escrow, resolution and insuree balances.
//!
//! A policy is keyed by flight and insuree. It is resolved exactly once, by
//! oracle finalization of its flight; the `resolved` flag is what stops a
//! second resolution of the same flight from crediting it again.

use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use shared_types::{Address, FlightKey, FlightStatus, Wei};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub flight: FlightKey,
    pub insuree: Address,
    pub premium: Wei,
    pub resolved: bool,
    /// Amount credited on resolution (zero unless the airline was at fault)
    pub credited: Wei,
}

/// Net value movement needed to bring the escrow in line with a purchase.
///
/// Replacing an open policy only moves the premium difference, so custody
/// never holds premium that no policy accounts for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PremiumSettlement {
    /// Caller pays this much into custody
    Deposit(Wei),
    /// Custody returns this much to the caller
    Refund(Wei),
    Unchanged,
}

/// A credit produced by resolving one policy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credit {
    pub insuree: Address,
    pub amount: Wei,
}

/// Running totals used by the solvency and payout invariants
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PolicyTotals {
    /// Premiums of every policy currently on the book
    pub premiums_escrowed: Wei,
    /// Premiums of policies resolved as airline-fault delays
    pub late_premiums: Wei,
    /// Everything ever credited to insurees
    pub credited: Wei,
    /// Everything ever withdrawn by insurees
    pub withdrawn: Wei,
}

#[derive(Clone, Debug, Default)]
pub struct PolicyBook {
    policies: BTreeMap<FlightKey, BTreeMap<Address, Policy>>,
    balances: BTreeMap<Address, Wei>,
    totals: PolicyTotals,
}

impl PolicyBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, flight: &FlightKey, insuree: &Address) -> Option<&Policy> {
        self.policies.get(flight).and_then(|book| book.get(insuree))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Policy> {
        self.policies.values().flat_map(|book| book.values())
    }

    pub fn balance_of(&self, insuree: &Address) -> Wei {
        self.balances.get(insuree).copied().unwrap_or(0)
    }

    /// Sum of every balance still owed.
    pub fn total_owed(&self) -> Wei {
        self.balances.values().sum()
    }

    pub fn totals(&self) -> PolicyTotals {
        self.totals
    }

    /// Check a purchase and work out the value it moves. Mutates nothing.
    pub fn quote_purchase(
        &self,
        flight: &FlightKey,
        insuree: &Address,
        premium: Wei,
        max_premium: Wei,
    ) -> LedgerResult<PremiumSettlement> {
        if premium == 0 {
            return Err(LedgerError::out_of_range("premium must be positive"));
        }
        if premium > max_premium {
            return Err(LedgerError::out_of_range(format!(
                "premium {premium} exceeds cap {max_premium}"
            )));
        }

        let settlement = match self.get(flight, insuree) {
            None => PremiumSettlement::Deposit(premium),
            Some(existing) if existing.resolved => {
                return Err(LedgerError::AlreadyResolved {
                    flight: flight.clone(),
                });
            }
            Some(existing) if premium > existing.premium => {
                PremiumSettlement::Deposit(premium - existing.premium)
            }
            Some(existing) if premium < existing.premium => {
                PremiumSettlement::Refund(existing.premium - premium)
            }
            Some(_) => PremiumSettlement::Unchanged,
        };
        Ok(settlement)
    }

    /// Create or overwrite the open policy. Call only after `quote_purchase`
    /// succeeded and its settlement was carried out.
    pub fn record_purchase(&mut self, flight: FlightKey, insuree: Address, premium: Wei) {
        let book = self.policies.entry(flight.clone()).or_default();
        let previous = book
            .insert(
                insuree,
                Policy {
                    flight,
                    insuree,
                    premium,
                    resolved: false,
                    credited: 0,
                },
            )
            .map(|p| p.premium)
            .unwrap_or(0);

        self.totals.premiums_escrowed = self
            .totals
            .premiums_escrowed
            .saturating_sub(previous)
            .saturating_add(premium);
    }

    /// Resolve every open policy on `flight`. Policies already resolved are
    /// skipped, so repeated resolution of a flight credits nobody twice.
    pub fn resolve(
        &mut self,
        flight: &FlightKey,
        status: FlightStatus,
        payout_for: impl Fn(Wei) -> Wei,
    ) -> Vec<Credit> {
        let Some(book) = self.policies.get_mut(flight) else {
            return Vec::new();
        };

        let mut credits = Vec::new();
        for policy in book.values_mut().filter(|p| !p.resolved) {
            policy.resolved = true;
            if !status.triggers_payout() {
                continue;
            }

            let amount = payout_for(policy.premium);
            policy.credited = amount;
            self.totals.late_premiums = self.totals.late_premiums.saturating_add(policy.premium);
            self.totals.credited = self.totals.credited.saturating_add(amount);
            let balance = self.balances.entry(policy.insuree).or_insert(0);
            *balance = balance.saturating_add(amount);
            credits.push(Credit {
                insuree: policy.insuree,
                amount,
            });
        }
        credits
    }

    /// Zero the insuree's balance and return what it held.
    ///
    /// The balance is cleared here, before the caller releases any value, so
    /// a re-entrant withdrawal observes zero.
    pub fn take_balance(&mut self, insuree: Address) -> LedgerResult<Wei> {
        let amount = self.balance_of(&insuree);
        if amount == 0 {
            return Err(LedgerError::ZeroBalance { insuree });
        }
        self.balances.remove(&insuree);
        self.totals.withdrawn = self.totals.withdrawn.saturating_add(amount);
        Ok(amount)
    }

    /// Undo `take_balance` when the release failed.
    pub fn restore_balance(&mut self, insuree: Address, amount: Wei) {
        let balance = self.balances.entry(insuree).or_insert(0);
        *balance = balance.saturating_add(amount);
        self.totals.withdrawn = self.totals.withdrawn.saturating_sub(amount);
    }
}

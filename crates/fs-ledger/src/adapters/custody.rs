//! In-memory custody
//!
//! Simulates the execution environment's value transfers: each address has
//! a wallet, and the ledger's custody is a single pool. Tests fund wallets
//! up front and read them back to observe payouts.

use crate::ports::outbound::{CustodyError, ValueCustody};
use parking_lot::RwLock;
use shared_types::{Address, Wei};
use std::collections::{HashMap, HashSet};

#[derive(Default)]
struct CustodyState {
    wallets: HashMap<Address, Wei>,
    held: Wei,
    /// Recipients that refuse incoming transfers
    rejecting: HashSet<Address>,
}

#[derive(Default)]
pub struct InMemoryCustody {
    state: RwLock<CustodyState>,
}

impl InMemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit a wallet from outside the ledger.
    pub fn fund_wallet(&self, address: Address, amount: Wei) {
        let mut state = self.state.write();
        let wallet = state.wallets.entry(address).or_insert(0);
        *wallet = wallet.saturating_add(amount);
    }

    pub fn wallet_balance(&self, address: &Address) -> Wei {
        self.state.read().wallets.get(address).copied().unwrap_or(0)
    }

    /// Make every release to `address` fail, as a recipient that reverts.
    pub fn reject_transfers_to(&self, address: Address) {
        self.state.write().rejecting.insert(address);
    }

    pub fn accept_transfers_to(&self, address: &Address) {
        self.state.write().rejecting.remove(address);
    }
}

impl ValueCustody for InMemoryCustody {
    fn deposit(&self, from: Address, amount: Wei) -> Result<(), CustodyError> {
        let mut state = self.state.write();
        let available = state.wallets.get(&from).copied().unwrap_or(0);
        if available < amount {
            return Err(CustodyError::InsufficientWallet {
                address: from,
                available,
                required: amount,
            });
        }
        state.wallets.insert(from, available - amount);
        state.held = state.held.saturating_add(amount);
        Ok(())
    }

    fn release(&self, to: Address, amount: Wei) -> Result<(), CustodyError> {
        let mut state = self.state.write();
        if state.rejecting.contains(&to) {
            return Err(CustodyError::Rejected { address: to });
        }
        if state.held < amount {
            return Err(CustodyError::Underfunded {
                held: state.held,
                requested: amount,
            });
        }
        state.held -= amount;
        let wallet = state.wallets.entry(to).or_insert(0);
        *wallet = wallet.saturating_add(amount);
        Ok(())
    }

    fn held(&self) -> Wei {
        self.state.read().held
    }
}

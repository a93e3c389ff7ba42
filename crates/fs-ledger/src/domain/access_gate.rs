//! Access gate: the process-wide operational flag plus caller roles.
//!
//! Every mutating operation passes through `require_operational`. The one
//! exception is `set_operational`, which the administrator may call while the
//! gate is closed so the ledger can be recovered.

use crate::error::{LedgerError, LedgerResult};
use shared_types::Address;
use std::collections::BTreeSet;

#[derive(Clone, Debug)]
pub struct AccessGate {
    administrator: Address,
    operational: bool,
    /// Callers the administrator delegated privileged operations to
    authorized_callers: BTreeSet<Address>,
}

impl AccessGate {
    /// The gate opens operational; the administrator is fixed for life.
    pub fn new(administrator: Address) -> Self {
        Self {
            administrator,
            operational: true,
            authorized_callers: BTreeSet::new(),
        }
    }

    pub fn is_operational(&self) -> bool {
        self.operational
    }

    pub fn require_operational(&self) -> LedgerResult<()> {
        if self.operational {
            Ok(())
        } else {
            Err(LedgerError::NotOperational)
        }
    }

    pub fn require_admin(&self, caller: Address, action: &'static str) -> LedgerResult<()> {
        if caller == self.administrator {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized { caller, action })
        }
    }

    /// Administrator or a delegated caller.
    pub fn require_privileged(&self, caller: Address, action: &'static str) -> LedgerResult<()> {
        if caller == self.administrator || self.authorized_callers.contains(&caller) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized { caller, action })
        }
    }

    /// Returns whether the flag actually changed.
    pub fn set_operational(&mut self, caller: Address, value: bool) -> LedgerResult<bool> {
        self.require_admin(caller, "set operational status")?;
        let changed = self.operational != value;
        self.operational = value;
        Ok(changed)
    }

    pub fn is_authorized(&self, caller: &Address) -> bool {
        self.authorized_callers.contains(caller)
    }

    /// Returns whether the caller set changed.
    pub fn authorize(&mut self, caller: Address, delegate: Address) -> LedgerResult<bool> {
        self.require_admin(caller, "authorize callers")?;
        self.require_operational()?;
        Ok(self.authorized_callers.insert(delegate))
    }

    /// Returns whether the caller set changed.
    pub fn deauthorize(&mut self, caller: Address, delegate: Address) -> LedgerResult<bool> {
        self.require_admin(caller, "deauthorize callers")?;
        self.require_operational()?;
        Ok(self.authorized_callers.remove(&delegate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Address {
        Address::from_low_u64(1)
    }

    fn stranger() -> Address {
        Address::from_low_u64(99)
    }

    #[test]
    fn test_starts_operational() {
        let gate = AccessGate::new(admin());
        assert!(gate.is_operational());
        assert!(gate.require_operational().is_ok());
    }

    #[test]
    fn test_only_admin_sets_status() {
        let mut gate = AccessGate::new(admin());
        assert!(matches!(
            gate.set_operational(stranger(), false),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert!(gate.is_operational());
    }

    #[test]
    fn test_recovery_allowed_while_closed() {
        let mut gate = AccessGate::new(admin());
        assert_eq!(gate.set_operational(admin(), false), Ok(true));
        assert_eq!(gate.require_operational(), Err(LedgerError::NotOperational));

        assert_eq!(gate.set_operational(admin(), true), Ok(true));
        assert!(gate.is_operational());
    }

    #[test]
    fn test_setting_same_value_is_not_a_change() {
        let mut gate = AccessGate::new(admin());
        assert_eq!(gate.set_operational(admin(), true), Ok(false));
    }

    #[test]
    fn test_delegation_is_gated() {
        let mut gate = AccessGate::new(admin());
        gate.set_operational(admin(), false).unwrap();
        assert_eq!(
            gate.authorize(admin(), stranger()),
            Err(LedgerError::NotOperational)
        );

        gate.set_operational(admin(), true).unwrap();
        assert_eq!(gate.authorize(admin(), stranger()), Ok(true));
        assert!(gate.require_privileged(stranger(), "fetch").is_ok());

        assert_eq!(gate.deauthorize(admin(), stranger()), Ok(true));
        assert!(gate.require_privileged(stranger(), "fetch").is_err());
    }
}

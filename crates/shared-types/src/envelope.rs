//! # Call Context Envelope
//!
//! The wrapper the execution environment attaches to every ledger call.
//!
//! ## Security Properties
//!
//! - **Envelope Authority**: `caller` is authenticated by the environment and is
//!   the sole source of truth for identity. Payloads MUST NOT carry a
//!   redundant caller field.
//! - **Attached Value**: `value` is the amount the caller moves into ledger
//!   custody alongside the call. Calls that do not accept value ignore it.

use crate::entities::{Address, Wei};
use serde::{Deserialize, Serialize};

/// Authenticated identity plus attached value for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Authenticated caller.
    pub caller: Address,
    /// Value attached to the call, in base units.
    pub value: Wei,
}

impl CallContext {
    /// A call without attached value.
    #[must_use]
    pub fn new(caller: Address) -> Self {
        Self { caller, value: 0 }
    }

    /// A call carrying `value` into custody.
    #[must_use]
    pub fn with_value(caller: Address, value: Wei) -> Self {
        Self { caller, value }
    }
}

//! # FlightSurety Telemetry
//!
//! Structured logging for the FlightSurety node.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use fs_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(TelemetryConfig::from_env())?;
//!     // Ledger and oracle pool logs are now emitted
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FS_SERVICE_NAME` | `flight-surety` | Service name in logs |
//! | `FS_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `FS_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `FS_JSON_LOGS` | `false` | JSON lines instead of pretty output |

mod config;
mod subscriber;

pub use config::TelemetryConfig;
pub use subscriber::env_filter;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install subscriber: {0}")]
    Install(String),
}

/// Install logging for the process. Call once, early in `main`.
pub fn init_telemetry(config: TelemetryConfig) -> Result<(), TelemetryError> {
    subscriber::init_subscriber(&config)
}

/// Span carrying the ledger component name.
///
/// ```rust,ignore
/// let _span = component_span!("oracle_pool", oracles = 20).entered();
/// ```
#[macro_export]
macro_rules! component_span {
    ($component:expr $(, $($field:tt)*)?) => {
        tracing::info_span!("component", component = $component $(, $($field)*)?)
    };
}

//! # Relay Telemetry
//!
//! Logging setup for hosts of the relay engine.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use relay_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_logging(&config).expect("Failed to init logging");
//!
//!     // Relay containers now log through `tracing`
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RELAY_SERVICE_NAME` | `trace-relay` | Service name in the startup line |
//! | `RELAY_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directives |
//! | `RELAY_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `RELAY_JSON_LOGS` | `false` (`true` in containers) | JSON formatting |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{env_filter, init_logging, TelemetryGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter '{0}'")]
    InvalidFilter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

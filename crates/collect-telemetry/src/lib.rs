//! # Collect Telemetry
//!
//! Structured logging bootstrap for processes embedding the collect modules.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use collect_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_logging(&TelemetryConfig::from_env()).expect("logging");
//!     // engines now log through the installed subscriber
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CM_SERVICE_NAME` | `collect-modules` | Service name attached to startup logs |
//! | `CM_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `CM_JSON_LOGS` | `false` (`true` in containers) | JSON formatted logs |
//! | `CM_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingGuard};

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The log filter directive did not parse.
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber was already installed.
    #[error("Failed to install subscriber: {0}")]
    SubscriberInit(String),
}

//! # Collect Auctions Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── integration/      # End-to-end auction flows
//! │   ├── dutch_flows.rs
//! │   ├── english_flows.rs
//! │   └── service_flows.rs
//! │
//! └── exploits/         # Attack simulations
//!     ├── reentrancy.rs # Currency hooks calling back into the engines
//!     └── griefing.rs   # Bidders refusing funds, racing collectors
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p collect-tests
//!
//! # By category
//! cargo test -p collect-tests integration::
//! cargo test -p collect-tests exploits::
//!
//! # Benchmarks
//! cargo bench -p collect-tests
//! ```


use collect_telemetry::{init_logging, LoggingGuard, TelemetryConfig};
use std::sync::OnceLock;

static LOGGING: OnceLock<Option<LoggingGuard>> = OnceLock::new();

/// Installs the suite-wide subscriber once. Honors `CM_LOG_LEVEL` and
/// `RUST_LOG`; stays silent at `warn` otherwise.
pub fn init_test_logging() {
    LOGGING.get_or_init(|| {
        let mut config = TelemetryConfig::for_service("collect-tests");
        if std::env::var("CM_LOG_LEVEL").is_err() && std::env::var("RUST_LOG").is_err() {
            config.log_level = "warn".to_string();
        }
        init_logging(&config).ok()
    });
}

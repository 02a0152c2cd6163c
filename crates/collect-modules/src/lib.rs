//! # Collect Modules - Auction-Priced Collects
//!
//! Pluggable collect modules for a social-graph host protocol. A publication
//! attaches one module at creation; the module then decides who may mint the
//! publication's single collect token and at what price.
//!
//! ## Strategies
//!
//! | Module | Engine | Sale |
//! |--------|--------|------|
//! | Dutch auction | `engine/dutch.rs` | Price decays linearly from start to end amount; first payer at the live price wins |
//! | English auction | `engine/english.rs` | Ascending bids, each at least 5% over the last; winner minted after expiry |
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | `end_amount <= start_amount`, `runtime > 0` | `domain/invariants.rs` - `check_dutch_invariants()` |
//! | Dutch price within `[end, start]`, non-increasing | `domain/pricing.rs` - `dutch_price()` |
//! | At most one Dutch collect | `engine/dutch.rs` - `claim()` |
//! | Each bid beats the last by the minimum raise | `domain/pricing.rs` - `minimum_bid()` |
//! | Custody holds exactly the leading bid | `domain/invariants.rs` - `check_escrow_invariant()` |
//! | Fee shares sum to the sale amount | `domain/fees.rs` - `FeeSplitter::split()` |
//! | One effective finalize | `engine/english.rs` - `close()` |
//!
//! ## Security
//!
//! - **Envelope-Only Identity**: callers are identified by the envelope sender
//! - **Checks-Effects-Interactions**: records advance before any currency
//!   code runs, so re-entrant calls observe the advanced record
//! - **All-or-nothing**: every currency movement of a call is journaled and
//!   reversed if a later step fails
//!
//! | Request | Authorized Sender(s) | Enforcement |
//! |---------|---------------------|-------------|
//! | `InitializeRequest` | Host hub ONLY | `service.rs` - `authorize_hub()` |
//! | `ProcessCollectRequest` | Host hub ONLY | `service.rs` - `authorize_hub()` |
//! | `MakeBidRequest` | Anyone (sender bids) | - |
//! | `FinishAuctionRequest` | Anyone | - |
//!
//! ## Outbound Dependencies
//!
//! | Collaborator | Trait | Purpose |
//! |--------------|-------|---------|
//! | Governance | `ModuleGlobals` | Currency whitelist, treasury fee |
//! | Host protocol | `HostGateway` | Follows, profile owners, minting |
//! | Token ledger | `CurrencyTransfer` | Pull, pay and reverse currency |
//! | Block time | `TimeSource` | Seconds since epoch |
//!
//! ## Usage Example
//!
//! ```ignore
//! use collect_modules::prelude::*;
//!
//! let service = CollectModuleService::new(config, dutch_deps, english_deps);
//! service.handle_initialize(hub, Uuid::new_v4(), request).await?;
//!
//! let quote = service.price_quote(key).await?;
//! println!("Next sale at {}", quote.amount);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod codec;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        AuctionPhase, CollectReference, DutchAuctionInitData, DutchAuctionRecord,
        DutchCollectData, EnglishAuctionInitData, EnglishAuctionRecord, ModuleKind,
    };

    // Value objects
    pub use crate::domain::value_objects::{
        parse_units, Address, CurrencyId, PublicationKey, Timestamp, TokenId, BPS_MAX, U256,
    };

    // Pricing and fees
    pub use crate::domain::fees::{FeeSplit, FeeSplitter};
    pub use crate::domain::pricing::{dutch_price, minimum_bid, DEFAULT_MIN_BID_INCREMENT_BPS};

    // Invariants
    pub use crate::domain::invariants::{InvariantCheckResult, InvariantViolation};

    // Engines
    pub use crate::engine::{DutchAuctionEngine, EngineConfig, EnglishAuctionEngine};

    // Ports
    pub use crate::ports::inbound::{
        AuctionQueryApi, AuctionResult, CollectModule, DutchAuctionApi, EnglishAuctionApi,
    };
    pub use crate::ports::outbound::{
        Collaborators, CurrencyTransfer, CurrencyWhitelist, HostGateway, ModuleGlobals,
        SystemTimeSource, TimeSource, TransferReceipt,
    };

    // Events
    pub use crate::events::{
        AuctionEvent, FinishAuctionRequestPayload, InitializeRequestPayload,
        MakeBidRequestPayload, ModuleResponsePayload, PriceQuoteResponsePayload,
        ProcessCollectRequestPayload,
    };

    // Errors
    pub use crate::errors::{AuctionError, GatewayError, IpcError, TransferError};

    // Adapters
    pub use crate::adapters::{
        InMemoryHost, InMemoryLedger, InMemoryModuleGlobals, LedgerClient, ManualTimeSource,
        TransferHook,
    };

    // Service
    #[cfg(any(test, feature = "testing"))]
    pub use crate::service::create_test_service;
    pub use crate::service::{CollectModuleService, ServiceConfig, ServiceStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Module family name used in logs.
pub const MODULE_NAME: &str = "Auction Collect Modules";

// =============================================================================
// TESTS
// =============================================================================

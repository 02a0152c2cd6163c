//! # Adapters Layer (Outer Hexagon)
//!
//! In-memory implementations of the driven ports. A deployment against a
//! real host and token ledger replaces these; tests and local runs wire them
//! directly.
//!
//! - `InMemoryLedger` / `LedgerClient`: fungible currency balances with
//!   allowances and an optional transfer hook that may re-enter the engines
//! - `InMemoryHost`: profiles, follows and collect token minting
//! - `InMemoryModuleGlobals`: currency whitelist and treasury
//! - `ManualTimeSource`: settable block time

pub mod clock;
pub mod globals;
pub mod host;
pub mod ledger;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use clock::*;
pub use globals::*;
pub use host::*;
pub use ledger::*;

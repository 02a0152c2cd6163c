//! # Auction Engines
//!
//! The two collect module strategies. Both follow the same discipline on
//! every entry point:
//!
//! 1. validate against a snapshot of the record and the collaborators
//! 2. apply the durable effect under the record lock
//! 3. release the lock, then move currency and mint through a
//!    [`settlement::Settlement`] journal
//!
//! If step 3 fails the journal is unwound and the effect restored, so the
//! call leaves no trace. A call re-entering the engine from a currency hook
//! during step 3 observes the fully advanced record.

pub mod dutch;
pub mod english;
pub(crate) mod settlement;

pub use dutch::DutchAuctionEngine;
pub use english::EnglishAuctionEngine;

use crate::domain::pricing::DEFAULT_MIN_BID_INCREMENT_BPS;

/// Tunables shared by both engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Minimum raise over the leading English bid, in basis points.
    pub min_bid_increment_bps: u16,
    /// Check record invariants after every mutation.
    pub verify_invariants: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_bid_increment_bps: DEFAULT_MIN_BID_INCREMENT_BPS,
            verify_invariants: true,
        }
    }
}

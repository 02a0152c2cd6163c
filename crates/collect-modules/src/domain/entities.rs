//! # Core Domain Entities
//!
//! Per-publication auction records and the parameter sets that create them.
//! Records are created once, never deleted, and only ever advanced by the
//! engine that owns them.

use crate::domain::value_objects::{Address, CurrencyId, PublicationKey, Timestamp, U256};
use serde::{Deserialize, Serialize};

// =============================================================================
// MODULE KIND
// =============================================================================

/// The closed set of auction strategies a publication can be attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleKind {
    /// Descending-price sale with a single collect.
    DutchAuction,
    /// Ascending-bid sale finalized after expiry.
    EnglishAuction,
}

impl ModuleKind {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DutchAuction => "dutch-auction",
            Self::EnglishAuction => "english-auction",
        }
    }
}

// =============================================================================
// COLLECT REFERENCE
// =============================================================================

/// How a collect reached the publication.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectReference {
    /// Collected directly from the original publication.
    Original,
    /// Collected through a mirror owned by `referrer_profile_id`.
    Mirror {
        /// Profile that published the mirror.
        referrer_profile_id: u64,
    },
}

impl CollectReference {
    /// Returns the profile entitled to a referral share, if any.
    ///
    /// A mirror of one's own publication earns nothing.
    #[must_use]
    pub fn referrer_for(self, key: PublicationKey) -> Option<u64> {
        match self {
            Self::Original => None,
            Self::Mirror {
                referrer_profile_id,
            } if referrer_profile_id != key.profile_id => Some(referrer_profile_id),
            Self::Mirror { .. } => None,
        }
    }
}

// =============================================================================
// DUTCH AUCTION
// =============================================================================

/// Initialization payload of a Dutch auction, decoded from the host's opaque
/// init data. Field order is the wire order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutchAuctionInitData {
    /// Price at the start of the window.
    pub start_amount: U256,
    /// Floor price reached once the runtime has elapsed.
    pub end_amount: U256,
    /// Length of the decay window in seconds.
    pub runtime_seconds: u64,
    /// Receiver of the sale proceeds net of fees.
    pub recipient: Address,
    /// Currency the sale is priced in.
    pub currency: CurrencyId,
    /// Referral share in basis points for mirror-sourced collects.
    pub referral_fee_bps: u16,
    /// Whether the collector must follow the publishing profile.
    pub should_follow: bool,
}

/// Collect payload of a Dutch auction: what the collector is willing to pay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutchCollectData {
    /// Currency the collector pays in.
    pub currency: CurrencyId,
    /// Amount the collector pays.
    pub amount: U256,
}

/// Stored Dutch auction state for one publication.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DutchAuctionRecord {
    /// Price at `start_timestamp`.
    pub start_amount: U256,
    /// Floor price, never above `start_amount`.
    pub end_amount: U256,
    /// Block time at initialization.
    pub start_timestamp: Timestamp,
    /// Decay window length, non-zero.
    pub runtime_seconds: u64,
    /// Receiver of the proceeds net of fees.
    pub recipient: Address,
    /// Sale currency.
    pub currency: CurrencyId,
    /// Referral share in basis points, at most 10000.
    pub referral_fee_bps: u16,
    /// Collectors must follow the publishing profile.
    pub should_follow: bool,
    /// Set by the single successful collect.
    pub collected: bool,
}

impl DutchAuctionRecord {
    /// Builds a fresh record from validated init data.
    #[must_use]
    pub fn new(data: DutchAuctionInitData, start_timestamp: Timestamp) -> Self {
        Self {
            start_amount: data.start_amount,
            end_amount: data.end_amount,
            start_timestamp,
            runtime_seconds: data.runtime_seconds,
            recipient: data.recipient,
            currency: data.currency,
            referral_fee_bps: data.referral_fee_bps,
            should_follow: data.should_follow,
            collected: false,
        }
    }

    /// Seconds elapsed since the auction started.
    #[must_use]
    pub fn elapsed(&self, now: Timestamp) -> u64 {
        now.saturating_sub(self.start_timestamp)
    }

    /// Returns true once the decay window has fully elapsed.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.elapsed(now) >= self.runtime_seconds
    }
}

// =============================================================================
// ENGLISH AUCTION
// =============================================================================

/// Initialization payload of an English auction.
///
/// `highest_bidder` is a placeholder that must be the zero address; the
/// initial `start_amount` acts as the reserve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnglishAuctionInitData {
    /// Absolute time after which bidding closes.
    pub end_timestamp: Timestamp,
    /// Receiver of the winning bid net of fees.
    pub recipient: Address,
    /// Currency bids are denominated in.
    pub currency: CurrencyId,
    /// Must be [`Address::ZERO`].
    pub highest_bidder: Address,
    /// Reserve: the minimum acceptable first bid.
    pub start_amount: U256,
    /// Whether bidders must follow the publishing profile.
    pub only_followers: bool,
}

/// Lifecycle phase of an English auction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionPhase {
    /// Accepting bids.
    Open,
    /// Bidding closed, `finish_auction` not yet called.
    ExpiredUnfinalized,
    /// Terminal.
    Finalized,
}

/// Stored English auction state for one publication.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnglishAuctionRecord {
    /// Block time at initialization.
    pub created_at: Timestamp,
    /// Bids are refused from this time on.
    pub end_timestamp: Timestamp,
    /// Receiver of the winning bid net of fees.
    pub recipient: Address,
    /// Bid currency.
    pub currency: CurrencyId,
    /// Reserve price configured at initialization.
    pub start_amount: U256,
    /// `None` until the first accepted bid.
    pub highest_bidder: Option<Address>,
    /// Equals `start_amount` until the first accepted bid.
    pub highest_bid: U256,
    /// Bidders must follow the publishing profile.
    pub only_followers: bool,
    /// Set once by the effective `finish_auction`.
    pub finalized: bool,
}

impl EnglishAuctionRecord {
    /// Builds a fresh record from validated init data.
    #[must_use]
    pub fn new(data: EnglishAuctionInitData, created_at: Timestamp) -> Self {
        Self {
            created_at,
            end_timestamp: data.end_timestamp,
            recipient: data.recipient,
            currency: data.currency,
            start_amount: data.start_amount,
            highest_bidder: None,
            highest_bid: data.start_amount,
            only_followers: data.only_followers,
            finalized: false,
        }
    }

    /// Current lifecycle phase at `now`.
    #[must_use]
    pub fn phase(&self, now: Timestamp) -> AuctionPhase {
        if self.finalized {
            AuctionPhase::Finalized
        } else if now < self.end_timestamp {
            AuctionPhase::Open
        } else {
            AuctionPhase::ExpiredUnfinalized
        }
    }

    /// The claim currently held in custody, if a real bidder exists.
    #[must_use]
    pub fn leading_bid(&self) -> Option<(Address, U256)> {
        self.highest_bidder.map(|bidder| (bidder, self.highest_bid))
    }
}

// =============================================================================
// TESTS
// =============================================================================

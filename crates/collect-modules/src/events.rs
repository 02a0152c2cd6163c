//! # Event Schema
//!
//! Request/response payloads exchanged with the host and with bidders, and
//! the events engines emit on every state transition.
//!
//! ## Envelope-Only Identity
//!
//! Payloads carry NO caller field. The caller (host hub, collector relay or
//! bidder) is taken from the envelope `sender` the service receives.
//!
//! | Request | Authorized Sender(s) |
//! |---------|---------------------|
//! | `InitializeRequestPayload` | Host hub ONLY |
//! | `ProcessCollectRequestPayload` | Host hub ONLY |
//! | `MakeBidRequestPayload` | Anyone (sender is the bidder) |
//! | `FinishAuctionRequestPayload` | Anyone |

use crate::domain::entities::{CollectReference, ModuleKind};
use crate::domain::fees::FeeSplit;
use crate::domain::value_objects::{
    Address, CurrencyId, PublicationKey, Timestamp, TokenId, U256,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// ENGINE EVENTS
// =============================================================================

/// State transition emitted by an auction engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionEvent {
    /// A Dutch auction record was created.
    DutchAuctionInitialized {
        /// Publication.
        key: PublicationKey,
        /// Opening price.
        start_amount: U256,
        /// Floor price.
        end_amount: U256,
        /// Block time the decay starts at.
        start_timestamp: Timestamp,
        /// Decay window in seconds.
        runtime_seconds: u64,
        /// Sale currency.
        currency: CurrencyId,
    },
    /// An English auction record was created.
    EnglishAuctionInitialized {
        /// Publication.
        key: PublicationKey,
        /// Close of bidding.
        end_timestamp: Timestamp,
        /// Minimum first bid.
        reserve: U256,
        /// Bid currency.
        currency: CurrencyId,
    },
    /// The single Dutch collect succeeded.
    Collected {
        /// Publication.
        key: PublicationKey,
        /// Paying account, owner of the minted token.
        collector: Address,
        /// Live price at the time of the collect.
        price: U256,
        /// Amount actually charged.
        paid: U256,
        /// How `paid` was distributed.
        split: FeeSplit,
        /// Owner of the referring profile, if a referral share was paid.
        referrer: Option<Address>,
        /// Minted collect token.
        token_id: TokenId,
    },
    /// A bid became the leading bid.
    BidPlaced {
        /// Publication.
        key: PublicationKey,
        /// New leader.
        bidder: Address,
        /// Leading bid, held in custody.
        amount: U256,
    },
    /// An outbid bidder got their funds back.
    BidRefunded {
        /// Publication.
        key: PublicationKey,
        /// Displaced leader.
        bidder: Address,
        /// Amount returned.
        amount: U256,
    },
    /// An English auction was finalized.
    AuctionFinished {
        /// Publication.
        key: PublicationKey,
        /// Winning bidder, `None` when nobody bid.
        winner: Option<Address>,
        /// Winning bid, zero when nobody bid.
        amount: U256,
        /// How the winning bid was distributed.
        split: FeeSplit,
        /// Token minted to the winner.
        token_id: Option<TokenId>,
    },
}

impl AuctionEvent {
    /// Publication the event belongs to.
    #[must_use]
    pub fn key(&self) -> PublicationKey {
        match self {
            Self::DutchAuctionInitialized { key, .. }
            | Self::EnglishAuctionInitialized { key, .. }
            | Self::Collected { key, .. }
            | Self::BidPlaced { key, .. }
            | Self::BidRefunded { key, .. }
            | Self::AuctionFinished { key, .. } => *key,
        }
    }

    /// Stable event name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::DutchAuctionInitialized { .. } => "DutchAuctionInitialized",
            Self::EnglishAuctionInitialized { .. } => "EnglishAuctionInitialized",
            Self::Collected { .. } => "Collected",
            Self::BidPlaced { .. } => "BidPlaced",
            Self::BidRefunded { .. } => "BidRefunded",
            Self::AuctionFinished { .. } => "AuctionFinished",
        }
    }
}

// =============================================================================
// INBOUND REQUESTS
// =============================================================================

/// Host request to attach a collect module to a publication.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InitializeRequestPayload {
    // NO sender - per Envelope-Only Identity
    /// Strategy to attach.
    pub module: ModuleKind,
    /// Publication being initialized.
    pub key: PublicationKey,
    /// Opaque init data, decoded by the engine.
    pub init_data: Vec<u8>,
}

/// Host request to process a collect.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProcessCollectRequestPayload {
    /// Publication being collected.
    pub key: PublicationKey,
    /// Account paying and receiving the token.
    pub collector: Address,
    /// Original publication or a mirror.
    pub reference: CollectReference,
    /// Opaque collect data, decoded by the engine.
    pub collect_data: Vec<u8>,
}

/// Bid on an English auction; the bidder is the envelope sender.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MakeBidRequestPayload {
    /// Publication being bid on.
    pub key: PublicationKey,
    /// Currency of the bid.
    pub currency: CurrencyId,
    /// Bid amount.
    pub amount: U256,
}

/// Finalize an English auction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FinishAuctionRequestPayload {
    /// Publication to finalize.
    pub key: PublicationKey,
}

// =============================================================================
// RESPONSES
// =============================================================================

/// Events produced by one accepted request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleResponsePayload {
    /// Emitted events in order.
    pub events: Vec<AuctionEvent>,
}

/// Answer to a price query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuoteResponsePayload {
    /// Strategy attached to the publication.
    pub module: ModuleKind,
    /// Live Dutch price, or next English minimum bid.
    pub amount: U256,
}

// =============================================================================
// TESTS
// =============================================================================

//! # Driving Ports (API - Inbound)
//!
//! Interfaces exposed by the auction engines. The host protocol drives
//! [`CollectModule`]; bidders and readers drive the strategy-specific APIs.

use crate::domain::entities::{
    AuctionPhase, CollectReference, DutchAuctionRecord, EnglishAuctionRecord, ModuleKind,
};
use crate::domain::value_objects::{Address, CurrencyId, PublicationKey, U256};
use crate::errors::{AuctionError, IpcError};
use crate::events::{AuctionEvent, PriceQuoteResponsePayload};
use async_trait::async_trait;

/// Result type shared by engine entry points.
pub type AuctionResult<T> = Result<T, AuctionError>;

// =============================================================================
// COLLECT MODULE (Host-facing capability)
// =============================================================================

/// Capability shared by every collect module strategy.
///
/// Each call is an isolated transaction: it either fully advances the record
/// of `key` or leaves it untouched.
pub trait CollectModule: Send + Sync {
    /// Strategy implemented by this module.
    fn kind(&self) -> ModuleKind;

    /// Creates the record of `key` from the host's opaque init data.
    ///
    /// # Errors
    ///
    /// `InvalidInitData`, `InvalidAuctionParams`, `CurrencyNotWhitelisted` or
    /// `AlreadyInitialized`.
    fn initialize_collect_module(
        &self,
        key: PublicationKey,
        init_data: &[u8],
    ) -> AuctionResult<Vec<AuctionEvent>>;

    /// Processes a collect attempt relayed by the host.
    ///
    /// # Errors
    ///
    /// Any precondition failure of the strategy, or an interaction failure.
    fn process_collect(
        &self,
        key: PublicationKey,
        collector: Address,
        reference: CollectReference,
        collect_data: &[u8],
    ) -> AuctionResult<Vec<AuctionEvent>>;
}

// =============================================================================
// DUTCH AUCTION API
// =============================================================================

/// Read side of the descending-price auction.
pub trait DutchAuctionApi: CollectModule {
    /// Live price of `key`. Callable at any time.
    ///
    /// # Errors
    ///
    /// `AuctionNotFound` if `key` was never initialized.
    fn current_price(&self, key: PublicationKey) -> AuctionResult<U256>;

    /// Snapshot of the stored record.
    fn record(&self, key: PublicationKey) -> Option<DutchAuctionRecord>;
}

// =============================================================================
// ENGLISH AUCTION API
// =============================================================================

/// Bidding and finalization of the ascending-bid auction.
pub trait EnglishAuctionApi: CollectModule {
    /// Places a bid, refunding the previous leader.
    ///
    /// # Errors
    ///
    /// `AuctionEnded`, `CurrencyMismatch`, `FollowInvalid`, `BidTooLow` or
    /// `TransferFailed`.
    fn make_bid(
        &self,
        key: PublicationKey,
        bidder: Address,
        currency: CurrencyId,
        amount: U256,
    ) -> AuctionResult<Vec<AuctionEvent>>;

    /// Smallest bid accepted next.
    ///
    /// # Errors
    ///
    /// `AuctionNotFound` if `key` was never initialized.
    fn minimum_bid(&self, key: PublicationKey) -> AuctionResult<U256>;

    /// Settles the auction after its end timestamp. Effective once.
    ///
    /// # Errors
    ///
    /// `AuctionNotEnded`, `AlreadyFinalized` (benign) or an interaction
    /// failure.
    fn finish_auction(&self, key: PublicationKey) -> AuctionResult<Vec<AuctionEvent>>;

    /// Lifecycle phase of `key`.
    ///
    /// # Errors
    ///
    /// `AuctionNotFound` if `key` was never initialized.
    fn phase(&self, key: PublicationKey) -> AuctionResult<AuctionPhase>;

    /// Amount currently held in custody for `key`.
    fn escrowed(&self, key: PublicationKey) -> U256;

    /// Snapshot of the stored record.
    fn record(&self, key: PublicationKey) -> Option<EnglishAuctionRecord>;
}

// =============================================================================
// QUERY API (Service-facing)
// =============================================================================

/// Async read access to attached auctions, served by the service facade.
#[async_trait]
pub trait AuctionQueryApi: Send + Sync {
    /// Strategy attached to `key`, if any.
    async fn attached_module(&self, key: PublicationKey) -> Option<ModuleKind>;

    /// Live Dutch price or next English minimum bid of `key`.
    ///
    /// # Errors
    ///
    /// `UnknownModule` if nothing is attached to `key`.
    async fn price_quote(&self, key: PublicationKey)
        -> Result<PriceQuoteResponsePayload, IpcError>;

    /// Lifecycle phase of an English auction.
    ///
    /// # Errors
    ///
    /// `UnknownModule` or `WrongModule` if `key` is not an English auction.
    async fn english_phase(&self, key: PublicationKey) -> Result<AuctionPhase, IpcError>;
}

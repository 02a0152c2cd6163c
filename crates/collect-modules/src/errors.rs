//! # Error Types
//!
//! All error types for the collect auction modules. Every failure is local to
//! the invocation that raised it and leaves stored records unchanged.

use crate::domain::value_objects::{Address, CurrencyId, PublicationKey, U256};
use thiserror::Error;

// =============================================================================
// AUCTION ERRORS
// =============================================================================

/// Errors raised by the Dutch and English auction engines.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuctionError {
    /// Init or collect payload did not decode to the expected field set.
    #[error("invalid init data: {0}")]
    InvalidInitData(String),

    /// Well-formed but semantically invalid parameters.
    #[error("invalid auction params: {0}")]
    InvalidAuctionParams(&'static str),

    /// Currency is not on the governance whitelist.
    #[error("currency not whitelisted: {0}")]
    CurrencyNotWhitelisted(CurrencyId),

    /// Payment or bid currency differs from the auction currency.
    #[error("currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch {
        /// Auction currency.
        expected: CurrencyId,
        /// Currency offered.
        got: CurrencyId,
    },

    /// Dutch decay window has elapsed.
    #[error("auction expired")]
    AuctionExpired,

    /// English bidding window has closed.
    #[error("auction ended")]
    AuctionEnded,

    /// English auction finalization attempted before the end timestamp.
    #[error("auction not ended")]
    AuctionNotEnded,

    /// Dutch publication already sold its single collect.
    #[error("already collected")]
    AlreadyCollected,

    /// English auction already finalized.
    #[error("already finalized")]
    AlreadyFinalized,

    /// The previous leader's refund is still in progress on this auction.
    #[error("refund to the previous bidder in progress")]
    RefundPending,

    /// Payment below the live Dutch price.
    #[error("insufficient payment: required {required}, offered {offered}")]
    InsufficientPayment {
        /// Live price.
        required: U256,
        /// Amount offered.
        offered: U256,
    },

    /// Bid below the English minimum bid.
    #[error("bid too low: minimum {minimum}, offered {offered}")]
    BidTooLow {
        /// Smallest acceptable bid.
        minimum: U256,
        /// Amount offered.
        offered: U256,
    },

    /// Caller does not follow the publishing profile.
    #[error("follow invalid")]
    FollowInvalid,

    /// Underlying currency movement failed.
    #[error("transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    /// No auction record for this publication.
    #[error("auction not found: {0}")]
    AuctionNotFound(PublicationKey),

    /// A record already exists for this publication.
    #[error("auction already initialized: {0}")]
    AlreadyInitialized(PublicationKey),

    /// English auctions mint only through `finish_auction`.
    #[error("direct collect unsupported; finish the auction instead")]
    DirectCollectUnsupported,

    /// The host refused to mint the collect token.
    #[error("mint failed: {0}")]
    MintFailed(GatewayError),
}

impl AuctionError {
    /// Returns true for failures that only report a no-op, such as
    /// finalizing an already finalized auction.
    #[must_use]
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::AlreadyFinalized)
    }

    /// Returns true if the failure came from an external collaborator
    /// rather than from validation.
    #[must_use]
    pub fn is_interaction_failure(&self) -> bool {
        matches!(self, Self::TransferFailed(_) | Self::MintFailed(_))
    }
}

// =============================================================================
// TRANSFER ERRORS
// =============================================================================

/// Errors from the currency transfer primitive.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Payer balance too small.
    #[error("insufficient balance of {account}: required {required}, available {available}")]
    InsufficientBalance {
        /// Payer.
        account: Address,
        /// Amount requested.
        required: U256,
        /// Payer balance.
        available: U256,
    },

    /// Payer has not approved the module for this amount.
    #[error("insufficient allowance of {owner}: required {required}, approved {approved}")]
    InsufficientAllowance {
        /// Payer.
        owner: Address,
        /// Amount requested.
        required: U256,
        /// Current approval for the module.
        approved: U256,
    },

    /// Currency implementation rejected the transfer.
    #[error("transfer rejected: {0}")]
    Rejected(String),
}

// =============================================================================
// GATEWAY ERRORS
// =============================================================================

/// Errors from the host protocol gateway.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Publication unknown to the host.
    #[error("publication not found: {0}")]
    PublicationNotFound(PublicationKey),

    /// Host refused to mint.
    #[error("mint rejected: {0}")]
    MintRejected(String),
}

// =============================================================================
// IPC ERRORS
// =============================================================================

/// Errors at the host-facing service boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IpcError {
    /// Caller is not allowed to send this request.
    #[error("unauthorized sender: {sender} (expected {expected})")]
    UnauthorizedSender {
        /// Envelope sender.
        sender: Address,
        /// Configured hub.
        expected: Address,
    },

    /// No module attached to this publication.
    #[error("no collect module attached to {0}")]
    UnknownModule(PublicationKey),

    /// Request targeted the wrong auction strategy.
    #[error("{key} is not attached to the {expected} module")]
    WrongModule {
        /// Publication addressed.
        key: PublicationKey,
        /// Name of the module the request needs.
        expected: &'static str,
    },

    /// Engine rejected the request.
    #[error(transparent)]
    Engine(#[from] AuctionError),
}

// =============================================================================
// TESTS
// =============================================================================

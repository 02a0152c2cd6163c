//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the auction engines depend on. The host protocol, governance
//! globals and the currency ledger implement these traits:
//! - Currency whitelist and treasury data (governance)
//! - Follow checks, profile ownership and collect minting (host protocol)
//! - Currency movement (token ledger)
//! - Block time
//!
//! Engines never hold a record lock while calling through these ports.

use crate::domain::value_objects::{Address, CurrencyId, PublicationKey, Timestamp, TokenId, U256};
use crate::errors::{GatewayError, TransferError};
use std::sync::Arc;

// =============================================================================
// GOVERNANCE
// =============================================================================

/// Read-only view of the governance currency whitelist.
pub trait CurrencyWhitelist: Send + Sync {
    /// Returns true if `currency` may be used to price auctions.
    fn is_whitelisted(&self, currency: CurrencyId) -> bool;
}

/// Governance-owned module globals: whitelist plus treasury configuration.
pub trait ModuleGlobals: CurrencyWhitelist {
    /// Account receiving the treasury share of every sale.
    fn treasury(&self) -> Address;

    /// Treasury fee in basis points.
    fn treasury_fee_bps(&self) -> u16;
}

// =============================================================================
// HOST PROTOCOL
// =============================================================================

/// Interface to the social-graph host that owns publications.
pub trait HostGateway: Send + Sync {
    /// Returns true if `follower` holds a valid follow of `profile_id`.
    fn is_following(&self, profile_id: u64, follower: Address) -> bool;

    /// Current owner of a profile, or `None` if it does not exist.
    fn profile_owner(&self, profile_id: u64) -> Option<Address>;

    /// Mints the collect token of `key` to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the host refuses to mint.
    fn mint_collect_token(
        &self,
        key: PublicationKey,
        recipient: Address,
    ) -> Result<TokenId, GatewayError>;
}

// =============================================================================
// CURRENCY
// =============================================================================

/// Proof of one completed currency movement, used to reverse it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Account debited.
    pub from: Address,
    /// Account credited.
    pub to: Address,
    /// Currency moved.
    pub currency: CurrencyId,
    /// Amount moved.
    pub amount: U256,
}

/// Currency movement primitive, bound to the calling module's own account.
///
/// Both operations are synchronous and fail loudly. A transfer may run
/// arbitrary code of the currency (hooks), including calls back into the
/// engine.
pub trait CurrencyTransfer: Send + Sync {
    /// Address of the module's custody account.
    fn custody(&self) -> Address;

    /// Moves `amount` from `payer` to `payee` using the module's allowance.
    ///
    /// # Errors
    ///
    /// Returns `TransferError` if balance or allowance is insufficient or the
    /// currency rejects the movement.
    fn transfer_from(
        &self,
        payer: Address,
        payee: Address,
        currency: CurrencyId,
        amount: U256,
    ) -> Result<TransferReceipt, TransferError>;

    /// Moves `amount` out of the module's custody account to `payee`.
    ///
    /// # Errors
    ///
    /// Returns `TransferError` if custody is short or the currency rejects
    /// the movement.
    fn transfer(
        &self,
        payee: Address,
        currency: CurrencyId,
        amount: U256,
    ) -> Result<TransferReceipt, TransferError>;

    /// Reverses a movement completed earlier in the same invocation.
    ///
    /// # Errors
    ///
    /// Returns `TransferError` if the credited account no longer holds the
    /// funds.
    fn reverse(&self, receipt: &TransferReceipt) -> Result<(), TransferError>;
}

// =============================================================================
// TIME
// =============================================================================

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current block time in seconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

// =============================================================================
// COLLABORATOR BUNDLE
// =============================================================================

/// Every outbound dependency of an auction engine.
#[derive(Clone)]
pub struct Collaborators {
    /// Whitelist and treasury.
    pub globals: Arc<dyn ModuleGlobals>,
    /// Host protocol.
    pub host: Arc<dyn HostGateway>,
    /// Currency ledger bound to the engine's custody account.
    pub currency: Arc<dyn CurrencyTransfer>,
    /// Block time.
    pub clock: Arc<dyn TimeSource>,
}

// =============================================================================
// TESTS
// =============================================================================

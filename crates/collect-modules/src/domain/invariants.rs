//! # Domain Invariants
//!
//! Conditions every stored auction record must satisfy. The engines check
//! them after each mutation; a violation means an engine bug, never a caller
//! error.

use crate::domain::entities::{DutchAuctionRecord, EnglishAuctionRecord};
use crate::domain::value_objects::{BPS_MAX, U256};

/// `end_amount <= start_amount`.
#[must_use]
pub fn check_price_range_invariant(record: &DutchAuctionRecord) -> bool {
    record.end_amount <= record.start_amount
}

/// `runtime_seconds > 0`.
#[must_use]
pub fn check_runtime_invariant(record: &DutchAuctionRecord) -> bool {
    record.runtime_seconds > 0
}

/// Referral fee within 0..=100%.
#[must_use]
pub fn check_referral_fee_invariant(record: &DutchAuctionRecord) -> bool {
    record.referral_fee_bps <= BPS_MAX
}

/// The bidding window closes after the record was created.
#[must_use]
pub fn check_end_after_creation_invariant(record: &EnglishAuctionRecord) -> bool {
    record.end_timestamp > record.created_at
}

/// A real leading bid never sits below the reserve.
#[must_use]
pub fn check_reserve_invariant(record: &EnglishAuctionRecord) -> bool {
    record.highest_bidder.is_none() || record.highest_bid >= record.start_amount
}

/// Custody holds exactly the leading bid (or nothing before the first bid).
#[must_use]
pub fn check_escrow_invariant(record: &EnglishAuctionRecord, escrowed: U256) -> bool {
    match (record.highest_bidder, record.finalized) {
        (Some(_), false) => escrowed == record.highest_bid,
        _ => escrowed.is_zero(),
    }
}

/// Checks every Dutch record invariant.
#[must_use]
pub fn check_dutch_invariants(record: &DutchAuctionRecord) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_price_range_invariant(record) {
        violations.push(InvariantViolation::EndAboveStart {
            start: record.start_amount,
            end: record.end_amount,
        });
    }
    if !check_runtime_invariant(record) {
        violations.push(InvariantViolation::ZeroRuntime);
    }
    if !check_referral_fee_invariant(record) {
        violations.push(InvariantViolation::FeeOutOfRange(record.referral_fee_bps));
    }

    InvariantCheckResult::from_violations(violations)
}

/// Checks every English record invariant, including custody.
#[must_use]
pub fn check_english_invariants(
    record: &EnglishAuctionRecord,
    escrowed: U256,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_end_after_creation_invariant(record) {
        violations.push(InvariantViolation::EndNotAfterCreation);
    }
    if !check_reserve_invariant(record) {
        violations.push(InvariantViolation::BidBelowReserve {
            bid: record.highest_bid,
            reserve: record.start_amount,
        });
    }
    if !check_escrow_invariant(record, escrowed) {
        violations.push(InvariantViolation::EscrowMismatch {
            escrowed,
            expected: if record.finalized || record.highest_bidder.is_none() {
                U256::zero()
            } else {
                record.highest_bid
            },
        });
    }

    InvariantCheckResult::from_violations(violations)
}

// =============================================================================
// INVARIANT TYPES
// =============================================================================

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    fn from_violations(violations: Vec<InvariantViolation>) -> Self {
        if violations.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(violations)
        }
    }

    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// A specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Dutch floor above the starting price.
    EndAboveStart { start: U256, end: U256 },
    /// Dutch runtime of zero seconds.
    ZeroRuntime,
    /// Fee outside 0..=10000 bps.
    FeeOutOfRange(u16),
    /// English window closes at or before creation.
    EndNotAfterCreation,
    /// English leading bid below the reserve.
    BidBelowReserve { bid: U256, reserve: U256 },
    /// Custody differs from the outstanding claim.
    EscrowMismatch { escrowed: U256, expected: U256 },
}

// =============================================================================
// TESTS
// =============================================================================

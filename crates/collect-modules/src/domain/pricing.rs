//! # Pricing
//!
//! Price curve of the Dutch auction and the minimum-bid rule of the English
//! auction. Pure integer arithmetic, no overflow on any `U256` input.

use crate::domain::entities::{DutchAuctionRecord, EnglishAuctionRecord};
use crate::domain::value_objects::{Timestamp, BPS_MAX, U256};

/// Default minimum raise over the leading English bid (5%).
pub const DEFAULT_MIN_BID_INCREMENT_BPS: u16 = 500;

/// Live Dutch price at `now`.
///
/// Decays linearly from `start_amount` to `end_amount` over the runtime.
/// The decrement is floored, so the reported price is never below the exact
/// linear value.
#[must_use]
pub fn dutch_price(record: &DutchAuctionRecord, now: Timestamp) -> U256 {
    let elapsed = record.elapsed(now);
    if elapsed >= record.runtime_seconds {
        return record.end_amount;
    }

    let span = record.start_amount.saturating_sub(record.end_amount);
    let decrement = mul_div_floor(span, elapsed, record.runtime_seconds);
    record.start_amount - decrement
}

/// Smallest bid the English auction accepts next.
///
/// Before the first bid this is the reserve. Afterwards it is the leading bid
/// raised by `increment_bps`, rounded up, and always strictly above the
/// leading bid.
#[must_use]
pub fn minimum_bid(record: &EnglishAuctionRecord, increment_bps: u16) -> U256 {
    if record.highest_bidder.is_none() {
        return record.start_amount;
    }

    let leading = record.highest_bid;
    let raise = mul_div_ceil(leading, u64::from(increment_bps), u64::from(BPS_MAX));
    leading.saturating_add(raise.max(U256::one()))
}

/// `value * numerator / denominator`, floored, for `numerator <= denominator`.
///
/// Splits `value` by the denominator so no intermediate exceeds `U256`.
fn mul_div_floor(value: U256, numerator: u64, denominator: u64) -> U256 {
    debug_assert!(denominator > 0);
    let denominator_wide = U256::from(denominator);
    let numerator_wide = U256::from(numerator);
    let (quotient, remainder) = value.div_mod(denominator_wide);
    quotient.saturating_mul(numerator_wide) + remainder * numerator_wide / denominator_wide
}

/// `value * numerator / denominator`, rounded up.
fn mul_div_ceil(value: U256, numerator: u64, denominator: u64) -> U256 {
    debug_assert!(denominator > 0);
    let denominator_wide = U256::from(denominator);
    let numerator_wide = U256::from(numerator);
    let (quotient, remainder) = value.div_mod(denominator_wide);
    let tail = remainder * numerator_wide;
    let (tail_quotient, tail_remainder) = tail.div_mod(denominator_wide);
    let rounded = if tail_remainder.is_zero() {
        tail_quotient
    } else {
        tail_quotient + U256::one()
    };
    quotient.saturating_mul(numerator_wide).saturating_add(rounded)
}

// =============================================================================
// TESTS
// =============================================================================

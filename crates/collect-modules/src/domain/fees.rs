//! # Fee Splitting
//!
//! Divides a sale amount between the protocol treasury, a referrer and the
//! recipient. Shares always add up to the sale amount; the rounding remainder
//! goes to the recipient.

use crate::domain::value_objects::{BPS_MAX, U256};
use serde::{Deserialize, Serialize};

/// Result of splitting one sale amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Paid to the publication's recipient.
    pub recipient: U256,
    /// Paid to the referrer of a mirror-sourced collect.
    pub referrer: U256,
    /// Paid to the protocol treasury.
    pub treasury: U256,
}

impl FeeSplit {
    /// Sum of all shares.
    #[must_use]
    pub fn total(&self) -> U256 {
        self.recipient + self.referrer + self.treasury
    }
}

/// Splits sale amounts according to the treasury fee in force.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeSplitter {
    treasury_fee_bps: u16,
}

impl FeeSplitter {
    /// Creates a splitter. Fees above 100% are clamped.
    #[must_use]
    pub fn new(treasury_fee_bps: u16) -> Self {
        Self {
            treasury_fee_bps: treasury_fee_bps.min(BPS_MAX),
        }
    }

    /// Splits `amount`.
    ///
    /// The treasury share is taken first; the referral share applies to what
    /// remains and only when the collect came through a reference.
    #[must_use]
    pub fn split(&self, amount: U256, referral_fee_bps: u16, via_reference: bool) -> FeeSplit {
        let treasury = bps_of(amount, self.treasury_fee_bps);
        let remaining = amount - treasury;
        let referral_fee_bps = if via_reference { referral_fee_bps } else { 0 };
        let (recipient, referrer) = split_referral(remaining, referral_fee_bps);
        FeeSplit {
            recipient,
            referrer,
            treasury,
        }
    }
}

/// Returns `(recipient_share, referrer_share)` with
/// `referrer_share = floor(amount * referral_fee_bps / 10000)`.
#[must_use]
pub fn split_referral(amount: U256, referral_fee_bps: u16) -> (U256, U256) {
    let referrer = bps_of(amount, referral_fee_bps);
    (amount - referrer, referrer)
}

/// `floor(amount * bps / 10000)` without intermediate overflow. `bps` is
/// clamped to 100%.
fn bps_of(amount: U256, bps: u16) -> U256 {
    let bps = U256::from(bps.min(BPS_MAX));
    let max = U256::from(BPS_MAX);
    let (quotient, remainder) = amount.div_mod(max);
    quotient * bps + remainder * bps / max
}

// =============================================================================
// TESTS
// =============================================================================

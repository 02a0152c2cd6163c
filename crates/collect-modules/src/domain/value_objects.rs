//! # Value Objects
//!
//! Immutable domain primitives for the collect auction modules.
//! These types represent concepts that are defined by their value, not identity.

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export U256 from primitive-types for 256-bit currency amounts
pub use primitive_types::U256;

/// Seconds since the UNIX epoch (block time).
pub type Timestamp = u64;

/// Identifier of a collect token minted by the host.
pub type TokenId = u64;

/// Basis points denominator (100% = 10 000 bps).
pub const BPS_MAX: u16 = 10_000;

/// Decimals of the fixed-point currency unit.
pub const CURRENCY_DECIMALS: usize = 18;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000), used as "no bidder".
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address whose every byte is `byte`. Handy for fixtures.
    #[must_use]
    pub const fn repeat(byte: u8) -> Self {
        Self([byte; 20])
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Parses 40 hex digits, with or without a `0x` prefix.
    #[must_use]
    pub fn from_hex(value: &str) -> Option<Self> {
        let digits = value.strip_prefix("0x").unwrap_or(value);
        if digits.len() != 40 || !digits.is_ascii() {
            return None;
        }
        let mut bytes = [0u8; 20];
        for (byte, pair) in bytes.iter_mut().zip(digits.as_bytes().chunks(2)) {
            let pair = std::str::from_utf8(pair).ok()?;
            *byte = u8::from_str_radix(pair, 16).ok()?;
        }
        Some(Self(bytes))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...")?;
        for byte in &self.0[18..] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

// =============================================================================
// CURRENCY
// =============================================================================

/// Identifier of a fungible currency (the token contract address).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CurrencyId(pub Address);

impl CurrencyId {
    /// Creates a currency identifier from its token address.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self(address)
    }

    /// Returns the token address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.0
    }
}

impl fmt::Debug for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({:?})", self.0)
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// =============================================================================
// PUBLICATION KEY
// =============================================================================

/// Identity of a publication within the host protocol.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublicationKey {
    /// Profile that published the content.
    pub profile_id: u64,
    /// Publication index within that profile.
    pub pub_id: u64,
}

impl PublicationKey {
    /// Creates a publication key.
    #[must_use]
    pub const fn new(profile_id: u64, pub_id: u64) -> Self {
        Self { profile_id, pub_id }
    }
}

impl fmt::Debug for PublicationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Publication({}/{})", self.profile_id, self.pub_id)
    }
}

impl fmt::Display for PublicationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.profile_id, self.pub_id)
    }
}

// =============================================================================
// AMOUNT HELPERS
// =============================================================================

/// Parses a decimal string such as `"19.9"` into 18-decimal fixed-point units.
///
/// Returns `None` for malformed input or more than 18 fractional digits.
#[must_use]
pub fn parse_units(value: &str) -> Option<U256> {
    let (whole, fraction) = match value.split_once('.') {
        Some((w, f)) => (w, f),
        None => (value, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if fraction.len() > CURRENCY_DECIMALS
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let whole = if whole.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole).ok()?
    };
    let padded = format!("{fraction:0<width$}", width = CURRENCY_DECIMALS);
    let fraction = U256::from_dec_str(&padded).ok()?;

    whole
        .checked_mul(U256::exp10(CURRENCY_DECIMALS))?
        .checked_add(fraction)
}

// =============================================================================
// TESTS
// =============================================================================

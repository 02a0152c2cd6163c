//! # Payload Codec
//!
//! Binary encoding of the opaque init and collect payloads the host passes
//! through. Decoding is exact: a payload with missing, extra or differently
//! typed fields is rejected as a whole.

use crate::errors::AuctionError;
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Upper bound on any payload the engines will decode.
pub const MAX_PAYLOAD_BYTES: u64 = 4 * 1024;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .with_limit(MAX_PAYLOAD_BYTES)
        .reject_trailing_bytes()
}

/// Encodes a payload.
///
/// # Errors
///
/// `InvalidInitData` if the value exceeds the size limit.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, AuctionError> {
    options()
        .serialize(value)
        .map_err(|e| AuctionError::InvalidInitData(e.to_string()))
}

/// Decodes a payload of exactly type `T`.
///
/// # Errors
///
/// `InvalidInitData` on any shape mismatch, truncation or trailing bytes.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AuctionError> {
    if bytes.is_empty() {
        return Err(AuctionError::InvalidInitData("empty payload".to_string()));
    }
    options()
        .deserialize(bytes)
        .map_err(|e| AuctionError::InvalidInitData(e.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================

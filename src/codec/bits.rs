//! Packed boolean vectors.
//!
//! Bit `i` of the sequence is stored in bit `i % 8` of byte `i / 8`
//! (least-significant bit first). The encoder always emits `ceil(k / 8)` bytes;
//! the decoder needs the logical length `k` from the protocol context because
//! the payload alone cannot tell trailing `false` values from padding.

use crate::{Error, Result};

/// Packs `values` into `ceil(len / 8)` bytes, zero padded.
pub fn encode_bits(values: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; values.len().div_ceil(8)];
    for (i, _) in values.iter().enumerate().filter(|(_, set)| **set) {
        bytes[i / 8] |= 1 << (i % 8);
    }
    bytes
}

/// Unpacks exactly `expected` booleans from `payload`.
///
/// A payload shorter than `ceil(expected / 8)` bytes is padded with `false`.
///
/// # Errors
///
/// Returns [`Error::MalformedFrame`] if the payload is longer than needed or
/// has bits set at or beyond index `expected`.
pub fn decode_bits(payload: &[u8], expected: usize) -> Result<Vec<bool>> {
    let needed = expected.div_ceil(8);
    if payload.len() > needed {
        return Err(Error::MalformedFrame(format!(
            "Bit vector of {expected} entries fits in {needed} bytes, got {}",
            payload.len()
        )));
    }

    if expected % 8 != 0 && payload.len() == needed {
        let unused = payload[needed - 1] >> (expected % 8);
        if unused != 0 {
            return Err(Error::MalformedFrame(format!(
                "Padding bits past entry {expected} are set"
            )));
        }
    }

    Ok((0..expected)
        .map(|i| payload.get(i / 8).is_some_and(|byte| byte & (1 << (i % 8)) != 0))
        .collect())
}

/// Bit vector payload as it arrived on the wire, before its length is known.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackedBits(Vec<u8>);

impl PackedBits {
    /// Packs a boolean sequence.
    pub fn pack(values: &[bool]) -> Self {
        Self(encode_bits(values))
    }

    /// Wraps raw payload bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the raw payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Unpacks into exactly `expected` booleans.
    pub fn unpack(&self, expected: usize) -> Result<Vec<bool>> {
        decode_bits(&self.0, expected)
    }
}

//! Type-tagged transport frames.
//!
//! A frame is the exact unit handed to and received from the transport:
//! one tag byte followed by the payload.
//!
//! | Tag    | Payload                                   |
//! |--------|-------------------------------------------|
//! | `0x00` | UTF-8 text                                |
//! | `0x01` | length-prefixed signed integers           |
//! | `0x02` | LSB-first packed booleans                 |

use num_bigint::{BigInt, BigUint};

use super::bits::PackedBits;
use super::integers::{decode_integers, encode_integers};
use crate::{Error, Result};

/// Tag of a text frame.
pub const TAG_TEXT: u8 = 0x00;
/// Tag of a big-integer sequence frame.
pub const TAG_INTEGERS: u8 = 0x01;
/// Tag of a boolean sequence frame.
pub const TAG_BITS: u8 = 0x02;

/// A decoded frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// Opaque human-readable text.
    Text(String),
    /// A sequence of signed big integers.
    Integers(Vec<BigInt>),
    /// A packed bit vector whose logical length comes from the protocol context.
    Bits(PackedBits),
}

impl Frame {
    /// Builds an integer frame from non-negative values.
    pub fn naturals(values: &[BigUint]) -> Self {
        Self::Integers(values.iter().cloned().map(BigInt::from).collect())
    }

    /// Builds a bit frame.
    pub fn bits(values: &[bool]) -> Self {
        Self::Bits(PackedBits::pack(values))
    }

    /// Returns the wire tag of this frame.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Text(_) => TAG_TEXT,
            Self::Integers(_) => TAG_INTEGERS,
            Self::Bits(_) => TAG_BITS,
        }
    }

    /// Serializes the frame: tag byte followed by the payload.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = vec![self.tag()];
        match self {
            Self::Text(text) => out.extend_from_slice(text.as_bytes()),
            Self::Integers(values) => out.extend(encode_integers(values)?),
            Self::Bits(bits) => out.extend_from_slice(bits.as_bytes()),
        }
        Ok(out)
    }

    /// Parses a frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrame`] for an empty buffer, an unknown tag or a
    /// malformed integer payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (&tag, payload) = bytes
            .split_first()
            .ok_or_else(|| Error::MalformedFrame("Empty frame".to_string()))?;

        match tag {
            TAG_TEXT => Ok(Self::Text(String::from_utf8_lossy(payload).into_owned())),
            TAG_INTEGERS => Ok(Self::Integers(decode_integers(payload)?)),
            TAG_BITS => Ok(Self::Bits(PackedBits::from_bytes(payload.to_vec()))),
            other => Err(Error::MalformedFrame(format!("Unknown frame tag {other:#04x}"))),
        }
    }
}

/// Converts decoded integers into protocol values, which are never negative.
pub fn to_naturals(values: &[BigInt]) -> Result<Vec<BigUint>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.to_biguint()
                .ok_or_else(|| Error::MalformedFrame(format!("Integer {i} is negative")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_frame_is_tag_plus_raw_bytes() {
        let frame = Frame::Text("hello".to_string());
        let bytes = frame.encode().unwrap();
        assert_eq!(bytes, b"\x00hello");
        assert_eq!(Frame::decode(&bytes).unwrap(), frame);
    }

    #[test]
    fn integer_frame_layout() {
        let frame = Frame::naturals(&[BigUint::from(200u32), BigUint::from(3u32)]);
        let bytes = frame.encode().unwrap();
        assert_eq!(bytes, vec![0x01, 0, 2, 0x00, 0xc8, 0, 1, 0x03]);
        assert_eq!(Frame::decode(&bytes).unwrap(), frame);
    }

    #[test]
    fn bit_frame_layout() {
        let frame = Frame::bits(&[false, true, true]);
        let bytes = frame.encode().unwrap();
        assert_eq!(bytes, vec![0x02, 0b110]);

        match Frame::decode(&bytes).unwrap() {
            Frame::Bits(bits) => assert_eq!(bits.unpack(3).unwrap(), vec![false, true, true]),
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_and_unknown_tag() {
        assert!(matches!(Frame::decode(&[]), Err(Error::MalformedFrame(_))));
        assert!(matches!(
            Frame::decode(&[0x07, 1, 2]),
            Err(Error::MalformedFrame(_))
        ));
    }

    #[test]
    fn negative_values_are_not_naturals() {
        let values = vec![BigInt::from(4), BigInt::from(-4)];
        assert!(matches!(to_naturals(&values), Err(Error::MalformedFrame(_))));
        assert_eq!(
            to_naturals(&values[..1]).unwrap(),
            vec![BigUint::from(4u32)]
        );
    }
}

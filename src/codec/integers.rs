//! Length-prefixed sequences of signed big integers.
//!
//! Each record is `[len_hi][len_lo][bytes]`: two 7-bit length digits giving
//! `len = len_hi * 128 + len_lo`, followed by the minimal big-endian
//! two's-complement encoding of the value.

use num_bigint::BigInt;

use crate::{Error, Result};

/// Base of the two-digit length prefix.
const LENGTH_RADIX: usize = 128;

/// Longest encodable integer, in bytes.
pub const MAX_INTEGER_LEN: usize = LENGTH_RADIX * LENGTH_RADIX - 1;

/// Encodes `values` as consecutive length-prefixed records.
///
/// # Errors
///
/// Returns [`Error::InvalidParams`] if any value needs more than
/// [`MAX_INTEGER_LEN`] bytes.
pub fn encode_integers(values: &[BigInt]) -> Result<Vec<u8>> {
    let mut out = Vec::new();

    for (i, value) in values.iter().enumerate() {
        let bytes = value.to_signed_bytes_be();
        if bytes.len() > MAX_INTEGER_LEN {
            return Err(Error::InvalidParams(format!(
                "Integer {i} needs {} bytes, limit is {MAX_INTEGER_LEN}",
                bytes.len()
            )));
        }

        out.push((bytes.len() / LENGTH_RADIX) as u8);
        out.push((bytes.len() % LENGTH_RADIX) as u8);
        out.extend_from_slice(&bytes);
    }

    Ok(out)
}

/// Decodes a payload produced by [`encode_integers`].
///
/// Parsing stops once fewer than two bytes remain.
///
/// # Errors
///
/// Returns [`Error::MalformedFrame`] if a length digit exceeds 127, a record is
/// empty, or a record runs past the end of the payload.
pub fn decode_integers(payload: &[u8]) -> Result<Vec<BigInt>> {
    let mut values = Vec::new();
    let mut pos = 0;

    while pos + 1 < payload.len() {
        let (hi, lo) = (payload[pos], payload[pos + 1]);
        if hi as usize >= LENGTH_RADIX || lo as usize >= LENGTH_RADIX {
            return Err(Error::MalformedFrame(format!(
                "Length digits {hi:#04x} {lo:#04x} at offset {pos} exceed 7 bits"
            )));
        }

        let len = hi as usize * LENGTH_RADIX + lo as usize;
        if len == 0 {
            return Err(Error::MalformedFrame(format!(
                "Zero-length integer record at offset {pos}"
            )));
        }

        pos += 2;
        let end = pos + len;
        if end > payload.len() {
            return Err(Error::MalformedFrame(format!(
                "Integer record of {len} bytes at offset {pos} overruns {}-byte payload",
                payload.len()
            )));
        }

        values.push(BigInt::from_signed_bytes_be(&payload[pos..end]));
        pos = end;
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use num_bigint::Sign;

    use super::*;

    #[test]
    fn encodes_minimal_twos_complement() {
        let values = [
            BigInt::from(0),
            BigInt::from(127),
            BigInt::from(128),
            BigInt::from(-1),
            BigInt::from(-129),
        ];
        let bytes = encode_integers(&values).unwrap();
        assert_eq!(
            bytes,
            vec![
                0, 1, 0x00, // 0
                0, 1, 0x7f, // 127
                0, 2, 0x00, 0x80, // 128 needs a sign byte
                0, 1, 0xff, // -1
                0, 2, 0xff, 0x7f, // -129
            ]
        );
        assert_eq!(decode_integers(&bytes).unwrap(), values);
    }

    #[test]
    fn length_prefix_uses_two_seven_bit_digits() {
        let value = BigInt::from_bytes_be(Sign::Plus, &[0x11; 300]);
        let bytes = encode_integers(std::slice::from_ref(&value)).unwrap();
        assert_eq!(&bytes[..2], &[2, 44]);
        assert_eq!(bytes.len(), 302);
        assert_eq!(decode_integers(&bytes).unwrap(), vec![value]);
    }

    #[test]
    fn largest_value_round_trips_and_one_more_byte_fails() {
        let max = BigInt::from_bytes_be(Sign::Plus, &[0x7f; MAX_INTEGER_LEN]);
        let bytes = encode_integers(std::slice::from_ref(&max)).unwrap();
        assert_eq!(&bytes[..2], &[127, 127]);
        assert_eq!(decode_integers(&bytes).unwrap(), vec![max]);

        let too_big = BigInt::from_bytes_be(Sign::Plus, &[0x7f; MAX_INTEGER_LEN + 1]);
        assert!(matches!(
            encode_integers(&[too_big]),
            Err(Error::InvalidParams(_))
        ));
    }

    #[test]
    fn trailing_single_byte_is_ignored() {
        let mut bytes = encode_integers(&[BigInt::from(5)]).unwrap();
        bytes.push(0x03);
        assert_eq!(decode_integers(&bytes).unwrap(), vec![BigInt::from(5)]);
    }

    #[test]
    fn rejects_overrun_and_bad_digits() {
        assert!(matches!(
            decode_integers(&[0, 4, 1, 2]),
            Err(Error::MalformedFrame(_))
        ));
        assert!(matches!(
            decode_integers(&[0x80, 1, 1]),
            Err(Error::MalformedFrame(_))
        ));
        assert!(matches!(
            decode_integers(&[0, 0, 0, 1, 1]),
            Err(Error::MalformedFrame(_))
        ));
    }

    #[test]
    fn empty_payload_decodes_to_nothing() {
        assert!(decode_integers(&[]).unwrap().is_empty());
        assert!(encode_integers(&[]).unwrap().is_empty());
    }
}

//! Wire codec shared by both parties.
//!
//! - **integers**: length-prefixed signed big-integer sequences
//! - **bits**: LSB-first packed boolean sequences
//! - **frame**: the type-tagged frame wrapping both

/// Packed boolean sequences.
pub mod bits;
/// Type-tagged frames.
pub mod frame;
/// Length-prefixed big-integer sequences.
pub mod integers;

pub use bits::{decode_bits, encode_bits, PackedBits};
pub use frame::{to_naturals, Frame, TAG_BITS, TAG_INTEGERS, TAG_TEXT};
pub use integers::{decode_integers, encode_integers, MAX_INTEGER_LEN};

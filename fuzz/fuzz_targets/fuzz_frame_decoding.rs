#![no_main]

use feige_fiat_shamir::codec::to_naturals;
use feige_fiat_shamir::{Commitment, Frame};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match Frame::decode(data) {
        Ok(Frame::Integers(values)) => {
            if let Ok(naturals) = to_naturals(&values) {
                let _ = Commitment::from_values(naturals);
            }
        }
        Ok(Frame::Bits(bits)) => {
            for k in [1, 8, 64] {
                let _ = bits.unpack(k);
            }
        }
        _ => {}
    }
});

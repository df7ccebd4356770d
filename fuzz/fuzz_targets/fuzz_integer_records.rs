#![no_main]

use feige_fiat_shamir::codec::{decode_integers, encode_integers};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(values) = decode_integers(data) {
        let encoded = encode_integers(&values).expect("decoded values re-encode");
        assert_eq!(decode_integers(&encoded).expect("re-encoded payload decodes"), values);
    }
});

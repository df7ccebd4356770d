use feige_fiat_shamir::codec::{
    decode_bits, decode_integers, encode_bits, encode_integers, Frame,
};
use feige_fiat_shamir::{Parameters, Prover, SecureRng, Verifier};
use num_bigint::{BigInt, BigUint};
use proptest::prelude::*;

fn big_int() -> impl Strategy<Value = BigInt> {
    prop::collection::vec(any::<u8>(), 1..48).prop_map(|bytes| BigInt::from_signed_bytes_be(&bytes))
}

proptest! {
    #[test]
    fn integer_sequences_survive_the_codec(values in prop::collection::vec(big_int(), 0..12)) {
        let payload = encode_integers(&values).expect("small integers should encode");
        prop_assert_eq!(decode_integers(&payload).expect("own output should decode"), values);
    }

    #[test]
    fn high_bit_values_get_a_sign_byte(bytes in prop::collection::vec(any::<u8>(), 1..32)) {
        let mut bytes = bytes;
        bytes[0] |= 0x80;
        let value = BigInt::from(BigUint::from_bytes_be(&bytes));

        let payload = encode_integers(std::slice::from_ref(&value)).unwrap();
        prop_assert_eq!(payload.len(), 2 + bytes.len() + 1);
        prop_assert_eq!(payload[2], 0x00);
        prop_assert_eq!(&payload[3..], &bytes[..]);
    }

    #[test]
    fn integer_decoder_never_panics(payload in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode_integers(&payload);
        let _ = Frame::decode(&payload);
    }

    #[test]
    fn bit_vectors_survive_the_codec(values in prop::collection::vec(any::<bool>(), 0..200)) {
        let payload = encode_bits(&values);
        prop_assert_eq!(payload.len(), values.len().div_ceil(8));
        prop_assert_eq!(decode_bits(&payload, values.len()).unwrap(), values);
    }

    #[test]
    fn oversized_bit_payloads_are_rejected(
        values in prop::collection::vec(any::<bool>(), 0..64),
        extra in 1u8..=255,
    ) {
        let mut payload = encode_bits(&values);
        payload.push(extra);
        prop_assert!(decode_bits(&payload, values.len()).is_err());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn honest_prover_is_accepted_for_any_basis_size(basis_len in 1usize..=24) {
        let mut rng = SecureRng::new();
        let params = Parameters::generate(16, basis_len, 10_000, &mut rng).unwrap();

        let mut prover = Prover::new(params);
        let mut verifier = Verifier::new(basis_len);

        verifier.receive_commitment(prover.commit().unwrap()).unwrap();
        let x = prover.witness(&mut rng).unwrap();
        let a = verifier.challenge(x, &mut rng).unwrap();
        prop_assert_eq!(a.len(), basis_len);
        let y = prover.respond(&a).unwrap();

        prop_assert!(verifier.check(&y).unwrap(), "honest response should be accepted");
    }
}

//! Probabilistic prime generation.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, RngCore};

use crate::{Error, Result};

/// Number of Miller-Rabin rounds with random bases. Error bound is 4^-40.
pub const MILLER_RABIN_ROUNDS: usize = 40;

/// Smallest bit-length accepted by [`generate_prime`].
pub const MIN_PRIME_BITS: u64 = 8;

const SMALL_PRIMES: [u32; 25] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];

/// Tests `n` for primality: trial division by small primes, then Miller-Rabin.
///
/// A `false` result is always correct. A `true` result is wrong with
/// probability at most `4^-MILLER_RABIN_ROUNDS`.
pub fn is_probable_prime<R: CryptoRng + RngCore>(n: &BigUint, rng: &mut R) -> bool {
    let two = BigUint::from(2u32);
    if *n < two {
        return false;
    }

    for &p in &SMALL_PRIMES {
        let p = BigUint::from(p);
        if *n == p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    // n - 1 = 2^r * d with d odd
    let n_minus_one = n - BigUint::one();
    let r = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> r;

    'witness: for _ in 0..MILLER_RABIN_ROUNDS {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);

        if x.is_one() || x == n_minus_one {
            continue 'witness;
        }

        for _ in 1..r {
            x = (&x * &x).mod_floor(n);
            if x == n_minus_one {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

/// Generates a probable prime of exactly `bits` bits.
///
/// Composite candidates are discarded and redrawn; the loop terminates almost
/// surely since primes of that size have density about `1 / (bits * ln 2)`.
pub fn generate_prime<R: CryptoRng + RngCore>(bits: u64, rng: &mut R) -> Result<BigUint> {
    if bits < MIN_PRIME_BITS {
        return Err(Error::InvalidParams(format!(
            "Prime bit-length {bits} is below the minimum of {MIN_PRIME_BITS}"
        )));
    }

    let top = BigUint::one() << (bits - 1);
    loop {
        let candidate = rng.gen_biguint(bits - 1) | &top | BigUint::one();
        if is_probable_prime(&candidate, rng) {
            return Ok(candidate);
        }
    }
}

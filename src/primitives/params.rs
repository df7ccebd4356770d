//! One-time setup of the modulus and the prover's secret basis.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::One;
use rand::{CryptoRng, RngCore};
use tracing::debug;

use super::prime::{generate_prime, MIN_PRIME_BITS};
use crate::{Error, Result};

/// Largest prime bit-length accepted by [`Parameters::generate`].
pub const MAX_PRIME_BITS: u64 = 4096;

/// Largest basis size accepted by [`Parameters::generate`].
pub const MAX_BASIS_LEN: usize = 1024;

/// Modulus `N = p·q` together with the secret basis `S`.
///
/// Only the prover holds a `Parameters`; the verifier learns `N` and the public
/// basis from the commitment.
#[derive(Clone, Debug)]
pub struct Parameters {
    modulus: BigUint,
    secret_basis: Vec<BigUint>,
    prime_bits: u64,
}

impl Parameters {
    /// Generates a fresh modulus from two distinct `prime_bits`-bit primes and
    /// samples `basis_len` values below `2^(2·prime_bits)` coprime to it.
    ///
    /// `max_attempts` caps the total number of basis draws.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidParams`] if `prime_bits` or `basis_len` is out of range
    /// - [`Error::ParameterGeneration`] if the basis sampling exceeds `max_attempts`
    pub fn generate<R: CryptoRng + RngCore>(
        prime_bits: u64,
        basis_len: usize,
        max_attempts: usize,
        rng: &mut R,
    ) -> Result<Self> {
        validate_shape(prime_bits, basis_len)?;

        let p = generate_prime(prime_bits, rng)?;
        let q = loop {
            let q = generate_prime(prime_bits, rng)?;
            if q != p {
                break q;
            }
        };
        let modulus = &p * &q;
        debug!(bits = modulus.bits(), "generated modulus");

        let secret_basis = sample_coprimes(&modulus, 2 * prime_bits, basis_len, max_attempts, rng)?;

        Ok(Self {
            modulus,
            secret_basis,
            prime_bits,
        })
    }

    /// Builds parameters from an existing modulus and secret basis.
    ///
    /// The modulus must be odd and every basis element coprime to it.
    pub fn from_parts(modulus: BigUint, secret_basis: Vec<BigUint>) -> Result<Self> {
        if modulus.is_even() || modulus <= BigUint::one() {
            return Err(Error::InvalidParams(
                "Modulus must be odd and greater than one".to_string(),
            ));
        }
        if secret_basis.is_empty() {
            return Err(Error::InvalidParams("Secret basis is empty".to_string()));
        }
        if let Some(i) = secret_basis
            .iter()
            .position(|s| !s.gcd(&modulus).is_one())
        {
            return Err(Error::InvalidParams(format!(
                "Basis element {i} is not coprime to the modulus"
            )));
        }

        let prime_bits = modulus.bits().div_ceil(2);
        Ok(Self {
            modulus,
            secret_basis,
            prime_bits,
        })
    }

    /// Returns the modulus `N`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Returns `k`, the number of basis elements.
    pub fn basis_len(&self) -> usize {
        self.secret_basis.len()
    }

    /// Returns `l`, the bit-length of each prime factor.
    pub fn prime_bits(&self) -> u64 {
        self.prime_bits
    }

    pub(crate) fn secret_basis(&self) -> &[BigUint] {
        &self.secret_basis
    }
}

fn validate_shape(prime_bits: u64, basis_len: usize) -> Result<()> {
    if !(MIN_PRIME_BITS..=MAX_PRIME_BITS).contains(&prime_bits) {
        return Err(Error::InvalidParams(format!(
            "Prime bit-length must be in {MIN_PRIME_BITS}..={MAX_PRIME_BITS}, got {prime_bits}"
        )));
    }
    if !(1..=MAX_BASIS_LEN).contains(&basis_len) {
        return Err(Error::InvalidParams(format!(
            "Basis size must be in 1..={MAX_BASIS_LEN}, got {basis_len}"
        )));
    }
    Ok(())
}

/// Rejection-samples `count` values below `2^bits` that are coprime to `modulus`.
fn sample_coprimes<R: CryptoRng + RngCore>(
    modulus: &BigUint,
    bits: u64,
    count: usize,
    max_attempts: usize,
    rng: &mut R,
) -> Result<Vec<BigUint>> {
    let mut values = Vec::with_capacity(count);
    let mut attempts = 0usize;

    while values.len() < count {
        if attempts >= max_attempts {
            return Err(Error::ParameterGeneration(format!(
                "Collected {} of {count} coprime basis values after {attempts} draws",
                values.len()
            )));
        }
        attempts += 1;

        let candidate = rng.gen_biguint(bits);
        if candidate.gcd(modulus).is_one() {
            values.push(candidate);
        }
    }

    debug!(count, attempts, "sampled secret basis");
    Ok(values)
}

/// Samples `r` uniformly from `[1, modulus)` with `gcd(r, modulus) = 1`.
pub(crate) fn sample_unit<R: CryptoRng + RngCore>(
    modulus: &BigUint,
    max_attempts: usize,
    rng: &mut R,
) -> Result<BigUint> {
    for _ in 0..max_attempts {
        let candidate = rng.gen_biguint_range(&BigUint::one(), modulus);
        if candidate.gcd(modulus).is_one() {
            return Ok(candidate);
        }
    }
    Err(Error::ParameterGeneration(format!(
        "No unit modulo N found after {max_attempts} draws"
    )))
}

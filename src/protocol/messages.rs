//! Values exchanged between prover and verifier.

use num_bigint::BigUint;

use crate::codec::Frame;
use crate::{Error, Result};

/// The prover's commitment: the modulus `N` and the public basis `V`.
///
/// On the wire this is one integer frame `[N, V_1, ..., V_k]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commitment {
    modulus: BigUint,
    public_basis: Vec<BigUint>,
}

impl Commitment {
    /// Creates a commitment from its parts.
    pub fn new(modulus: BigUint, public_basis: Vec<BigUint>) -> Self {
        Self {
            modulus,
            public_basis,
        }
    }

    /// Splits a decoded integer sequence into modulus and public basis.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedFrame`] if the sequence does not hold a modulus
    /// and at least one basis value.
    pub fn from_values(mut values: Vec<BigUint>) -> Result<Self> {
        if values.len() < 2 {
            return Err(Error::MalformedFrame(format!(
                "Commitment needs a modulus and at least one basis value, got {} integers",
                values.len()
            )));
        }
        let public_basis = values.split_off(1);
        let modulus = values.remove(0);
        Ok(Self::new(modulus, public_basis))
    }

    /// Returns the modulus `N`.
    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    /// Returns the public basis `V`.
    pub fn public_basis(&self) -> &[BigUint] {
        &self.public_basis
    }

    /// Encodes the commitment as an integer frame, modulus first.
    pub fn to_frame(&self) -> Frame {
        let mut values = Vec::with_capacity(self.public_basis.len() + 1);
        values.push(self.modulus.clone());
        values.extend(self.public_basis.iter().cloned());
        Frame::naturals(&values)
    }
}

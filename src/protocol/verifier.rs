use std::fmt;

use num_bigint::BigUint;
use num_traits::Zero;
use rand::{CryptoRng, Rng, RngCore};
use tracing::{debug, trace};

use super::messages::Commitment;
use crate::{Error, Result};

/// Verifier ("Victor") round state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VerifierState {
    /// Waiting for the prover's commitment.
    AwaitingCommitment = 0,
    /// Commitment stored; the challenge goes out once the witness arrives.
    Committed = 1,
    /// Challenge issued; waiting for the response to check.
    AwaitingResponse = 2,
}

impl fmt::Display for VerifierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingCommitment => "awaiting-commitment",
            Self::Committed => "committed",
            Self::AwaitingResponse => "awaiting-response",
        };
        write!(f, "{name}")
    }
}

/// Verifier for the Feige-Fiat-Shamir identification protocol.
///
/// Checks `Y^2 = X * prod(V_i for A_i set) (mod N)`. Commitment, witness and
/// challenge are single-round values and are cleared by [`check`](Self::check).
#[derive(Clone, Debug)]
pub struct Verifier {
    modulus: Option<BigUint>,
    basis_len: usize,
    public_basis: Option<Vec<BigUint>>,
    witness: Option<BigUint>,
    challenge: Option<Vec<bool>>,
    state: VerifierState,
}

impl Verifier {
    /// Creates a verifier expecting `basis_len` basis values.
    ///
    /// The modulus is pinned by the first commitment received.
    pub fn new(basis_len: usize) -> Self {
        Self {
            modulus: None,
            basis_len,
            public_basis: None,
            witness: None,
            challenge: None,
            state: VerifierState::AwaitingCommitment,
        }
    }

    /// Creates a verifier bound to a known modulus.
    pub fn with_modulus(modulus: BigUint, basis_len: usize) -> Self {
        Self {
            modulus: Some(modulus),
            ..Self::new(basis_len)
        }
    }

    /// Returns the current round state.
    pub fn state(&self) -> VerifierState {
        self.state
    }

    /// Returns `k`, the expected number of basis values.
    pub fn basis_len(&self) -> usize {
        self.basis_len
    }

    /// Returns the modulus, once known.
    pub fn modulus(&self) -> Option<&BigUint> {
        self.modulus.as_ref()
    }

    /// Stores the prover's commitment for this round.
    ///
    /// Valid in [`VerifierState::AwaitingCommitment`].
    ///
    /// # Errors
    ///
    /// - [`Error::StateViolation`] in any other state
    /// - [`Error::InvalidParams`] if the basis does not have `k` entries, the
    ///   modulus differs from the pinned one, or a basis value is zero mod `N`
    pub fn receive_commitment(&mut self, commitment: Commitment) -> Result<()> {
        self.ensure(VerifierState::AwaitingCommitment, "receive_commitment")?;

        let n = commitment.modulus();
        if commitment.public_basis().len() != self.basis_len {
            return Err(Error::InvalidParams(format!(
                "Public basis has {} values, expected {}",
                commitment.public_basis().len(),
                self.basis_len
            )));
        }
        if let Some(pinned) = &self.modulus {
            if pinned != n {
                return Err(Error::InvalidParams(
                    "Commitment modulus differs from the session modulus".to_string(),
                ));
            }
        }
        if n.is_zero() || n.bits() < 2 {
            return Err(Error::InvalidParams("Degenerate modulus".to_string()));
        }
        if let Some(i) = commitment
            .public_basis()
            .iter()
            .position(|v| (v % n).is_zero())
        {
            return Err(Error::InvalidParams(format!(
                "Public basis value {i} is zero modulo N"
            )));
        }

        if self.modulus.is_none() {
            debug!(bits = n.bits(), "pinned session modulus");
            self.modulus = Some(n.clone());
        }
        self.public_basis = Some(commitment.public_basis().to_vec());
        self.state = VerifierState::Committed;
        Ok(())
    }

    /// Stores the witness `X` and samples a uniform `k`-bit challenge.
    ///
    /// Valid in [`VerifierState::Committed`].
    ///
    /// # Errors
    ///
    /// - [`Error::StateViolation`] in any other state
    /// - [`Error::InvalidParams`] if `X` is zero mod `N`, which would let a
    ///   zero response pass
    pub fn challenge<R: CryptoRng + RngCore>(
        &mut self,
        witness: BigUint,
        rng: &mut R,
    ) -> Result<Vec<bool>> {
        self.ensure(VerifierState::Committed, "challenge")?;
        let n = self.require_modulus("challenge")?;

        if (&witness % n).is_zero() {
            return Err(Error::InvalidParams("Witness is zero modulo N".to_string()));
        }

        let challenge: Vec<bool> = (0..self.basis_len).map(|_| rng.gen()).collect();

        self.witness = Some(witness);
        self.challenge = Some(challenge.clone());
        self.state = VerifierState::AwaitingResponse;
        Ok(challenge)
    }

    /// Checks the response and returns the verdict.
    ///
    /// Valid in [`VerifierState::AwaitingResponse`]. Afterwards the verifier is
    /// back in [`VerifierState::AwaitingCommitment`] with commitment, witness and
    /// challenge cleared.
    pub fn check(&mut self, response: &BigUint) -> Result<bool> {
        self.ensure(VerifierState::AwaitingResponse, "check")?;
        let n = self.require_modulus("check")?.clone();

        let (Some(basis), Some(x), Some(a)) = (
            self.public_basis.take(),
            self.witness.take(),
            self.challenge.take(),
        ) else {
            self.reset();
            return Err(Error::StateViolation {
                operation: "check",
                state: VerifierState::AwaitingResponse.to_string(),
            });
        };

        let lhs = response.modpow(&BigUint::from(2u32), &n);
        let rhs = basis
            .iter()
            .zip(&a)
            .filter(|(_, selected)| **selected)
            .fold(&x % &n, |acc, (v, _)| (acc * v) % &n);

        let accepted = lhs == rhs;
        trace!(accepted, "verifier checked response");

        self.state = VerifierState::AwaitingCommitment;
        Ok(accepted)
    }

    /// Abandons the current round. The pinned modulus is kept.
    pub fn reset(&mut self) {
        self.public_basis = None;
        self.witness = None;
        self.challenge = None;
        self.state = VerifierState::AwaitingCommitment;
    }

    fn ensure(&self, expected: VerifierState, operation: &'static str) -> Result<()> {
        if self.state != expected {
            return Err(Error::StateViolation {
                operation,
                state: self.state.to_string(),
            });
        }
        Ok(())
    }

    fn require_modulus(&self, operation: &'static str) -> Result<&BigUint> {
        self.modulus.as_ref().ok_or(Error::StateViolation {
            operation,
            state: self.state.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::primitives::Parameters;
    use crate::protocol::Prover;

    fn toy_prover() -> Prover {
        Prover::new(
            Parameters::from_parts(
                BigUint::from(3_501_123_401u64),
                vec![
                    BigUint::from(1_234_567u32),
                    BigUint::from(89_101u32),
                    BigUint::from(424_242u32),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn honest_round_is_accepted() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut prover = toy_prover();
        let mut verifier = Verifier::new(3);

        verifier.receive_commitment(prover.commit().unwrap()).unwrap();
        let x = prover.witness(&mut rng).unwrap();
        let a = verifier.challenge(x, &mut rng).unwrap();
        assert_eq!(a.len(), 3);
        let y = prover.respond(&a).unwrap();

        assert!(verifier.check(&y).unwrap());
        assert_eq!(verifier.state(), VerifierState::AwaitingCommitment);
        assert_eq!(verifier.modulus(), Some(&BigUint::from(3_501_123_401u64)));
    }

    #[test]
    fn altered_response_is_rejected() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut prover = toy_prover();
        let mut verifier = Verifier::new(3);

        verifier.receive_commitment(prover.commit().unwrap()).unwrap();
        let x = prover.witness(&mut rng).unwrap();
        let a = verifier.challenge(x, &mut rng).unwrap();
        let y = prover.respond(&a).unwrap();

        assert!(!verifier.check(&(y + 1u32)).unwrap());
    }

    #[test]
    fn check_before_challenge_is_a_state_violation() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut prover = toy_prover();
        let mut verifier = Verifier::new(3);

        assert!(matches!(
            verifier.check(&BigUint::from(1u32)),
            Err(Error::StateViolation { operation: "check", .. })
        ));
        assert!(matches!(
            verifier.challenge(BigUint::from(4u32), &mut rng),
            Err(Error::StateViolation { .. })
        ));

        verifier.receive_commitment(prover.commit().unwrap()).unwrap();
        assert!(matches!(
            verifier.check(&BigUint::from(1u32)),
            Err(Error::StateViolation { .. })
        ));
        assert_eq!(verifier.state(), VerifierState::Committed);
    }

    #[test]
    fn rejects_wrong_basis_length_and_foreign_modulus() {
        let mut prover = toy_prover();
        let commitment = prover.commit().unwrap();

        let mut short = Verifier::new(2);
        assert!(matches!(
            short.receive_commitment(commitment.clone()),
            Err(Error::InvalidParams(_))
        ));
        assert_eq!(short.state(), VerifierState::AwaitingCommitment);

        let mut pinned = Verifier::with_modulus(BigUint::from(3_233u32), 3);
        assert!(matches!(
            pinned.receive_commitment(commitment),
            Err(Error::InvalidParams(_))
        ));
    }

    #[test]
    fn rejects_degenerate_witness() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut prover = toy_prover();
        let mut verifier = Verifier::new(3);
        verifier.receive_commitment(prover.commit().unwrap()).unwrap();

        let n = BigUint::from(3_501_123_401u64);
        assert!(matches!(
            verifier.challenge(n, &mut rng),
            Err(Error::InvalidParams(_))
        ));
        assert_eq!(verifier.state(), VerifierState::Committed);
    }

    #[test]
    fn reset_abandons_round() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut prover = toy_prover();
        let mut verifier = Verifier::new(3);
        verifier.receive_commitment(prover.commit().unwrap()).unwrap();
        verifier.challenge(prover.witness(&mut rng).unwrap(), &mut rng).unwrap();

        verifier.reset();
        assert_eq!(verifier.state(), VerifierState::AwaitingCommitment);
        assert!(matches!(
            verifier.check(&BigUint::from(1u32)),
            Err(Error::StateViolation { .. })
        ));
    }
}

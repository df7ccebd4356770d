use std::fmt;

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use tracing::trace;

use super::messages::Commitment;
use crate::primitives::params::sample_unit;
use crate::primitives::Parameters;
use crate::{Error, Result, DEFAULT_MAX_ATTEMPTS};

/// Prover ("Peggy") round state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProverState {
    /// Nothing sent in this round yet.
    ReadyToCommit = 0,
    /// Commitment produced; next comes the witness.
    Committed = 1,
    /// Witness produced; waiting to answer the challenge.
    Challenged = 2,
    /// Response produced; the round is over from the prover's side.
    Responded = 3,
}

impl fmt::Display for ProverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReadyToCommit => "ready-to-commit",
            Self::Committed => "committed",
            Self::Challenged => "challenged",
            Self::Responded => "responded",
        };
        write!(f, "{name}")
    }
}

/// Prover for the Feige-Fiat-Shamir identification protocol.
///
/// Proves knowledge of the secret basis `S` behind the public basis
/// `V_i = S_i^2 mod N` without revealing it. One round runs
/// [`commit`](Self::commit), [`witness`](Self::witness),
/// [`respond`](Self::respond); [`advance_round`](Self::advance_round) starts
/// the next one.
///
/// # Security
///
/// - The witness nonce `r` is sampled fresh per round and dropped after the
///   response; reusing it would reveal `S_i` for the challenged indices
/// - The secret basis never leaves this type
pub struct Prover {
    params: Parameters,
    public_basis: Option<Vec<BigUint>>,
    nonce: Option<Nonce>,
    witness: Option<BigUint>,
    state: ProverState,
    max_attempts: usize,
}

impl Prover {
    /// Creates a prover that owns the given parameters.
    pub fn new(params: Parameters) -> Self {
        Self {
            params,
            public_basis: None,
            nonce: None,
            witness: None,
            state: ProverState::ReadyToCommit,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Caps the number of draws when sampling the witness nonce.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Returns the current round state.
    pub fn state(&self) -> ProverState {
        self.state
    }

    /// Returns the modulus `N`.
    pub fn modulus(&self) -> &BigUint {
        self.params.modulus()
    }

    /// Returns `k`, the number of basis elements.
    pub fn basis_len(&self) -> usize {
        self.params.basis_len()
    }

    /// Returns the witness `X` of the current round, once produced.
    pub fn current_witness(&self) -> Option<&BigUint> {
        self.witness.as_ref()
    }

    /// Produces the commitment `(N, V)` with `V_i = S_i^2 mod N`.
    ///
    /// Valid in [`ProverState::ReadyToCommit`]. `V` is computed once and reused
    /// in later rounds.
    pub fn commit(&mut self) -> Result<Commitment> {
        self.ensure(ProverState::ReadyToCommit, "commit")?;

        let n = self.params.modulus();
        let public_basis = self
            .public_basis
            .get_or_insert_with(|| {
                self.params
                    .secret_basis()
                    .iter()
                    .map(|s| s.modpow(&BigUint::from(2u32), n))
                    .collect()
            })
            .clone();

        self.state = ProverState::Committed;
        trace!(k = public_basis.len(), "prover committed");
        Ok(Commitment::new(n.clone(), public_basis))
    }

    /// Samples the nonce `r` and returns the witness `X = r^2 mod N`.
    ///
    /// Valid in [`ProverState::Committed`].
    pub fn witness<R: CryptoRng + RngCore>(&mut self, rng: &mut R) -> Result<BigUint> {
        self.ensure(ProverState::Committed, "witness")?;

        let n = self.params.modulus();
        let r = sample_unit(n, self.max_attempts, rng)?;
        let x = r.modpow(&BigUint::from(2u32), n);

        self.nonce = Some(Nonce::new(r));
        self.witness = Some(x.clone());
        self.state = ProverState::Challenged;
        Ok(x)
    }

    /// Answers the challenge with `Y = r * prod(S_i for A_i set) mod N`.
    ///
    /// Valid in [`ProverState::Challenged`]. The nonce is discarded afterwards.
    ///
    /// # Errors
    ///
    /// - [`Error::StateViolation`] outside [`ProverState::Challenged`]
    /// - [`Error::InvalidParams`] if `challenge` does not have exactly `k` entries
    pub fn respond(&mut self, challenge: &[bool]) -> Result<BigUint> {
        self.ensure(ProverState::Challenged, "respond")?;

        if challenge.len() != self.basis_len() {
            return Err(Error::InvalidParams(format!(
                "Challenge has {} entries, expected {}",
                challenge.len(),
                self.basis_len()
            )));
        }

        let nonce = self.nonce.take().ok_or(Error::StateViolation {
            operation: "respond",
            state: self.state.to_string(),
        })?;

        let n = self.params.modulus();
        let y = self
            .params
            .secret_basis()
            .iter()
            .zip(challenge)
            .filter(|(_, selected)| **selected)
            .fold(nonce.r() % n, |acc, (s, _)| (acc * s) % n);

        self.state = ProverState::Responded;
        Ok(y)
    }

    /// Resets to [`ProverState::ReadyToCommit`], discarding the round's nonce
    /// and witness. `N`, `S` and `V` are kept.
    pub fn advance_round(&mut self) {
        self.nonce = None;
        self.witness = None;
        self.state = ProverState::ReadyToCommit;
    }

    fn ensure(&self, expected: ProverState, operation: &'static str) -> Result<()> {
        if self.state != expected {
            return Err(Error::StateViolation {
                operation,
                state: self.state.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for Prover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prover")
            .field("modulus", self.params.modulus())
            .field("basis_len", &self.basis_len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Secret nonce `r` behind the witness of one round.
struct Nonce {
    r: BigUint,
}

impl Nonce {
    fn new(r: BigUint) -> Self {
        Self { r }
    }

    fn r(&self) -> &BigUint {
        &self.r
    }
}

#[cfg(test)]
mod tests {
    use num_integer::Integer;
    use num_traits::One;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn toy_params() -> Parameters {
        // 3_501_123_401 = 56467 * 62003
        Parameters::from_parts(
            BigUint::from(3_501_123_401u64),
            vec![BigUint::from(1_234_567u32), BigUint::from(89_101u32)],
        )
        .unwrap()
    }

    #[test]
    fn public_basis_is_square_of_secret() {
        let params = toy_params();
        let n = params.modulus().clone();
        let mut prover = Prover::new(params);

        let commitment = prover.commit().unwrap();
        assert_eq!(commitment.modulus(), &n);
        assert_eq!(
            commitment.public_basis()[0],
            BigUint::from(1_234_567u64 * 1_234_567u64 % 3_501_123_401u64)
        );
        assert_eq!(prover.state(), ProverState::Committed);
    }

    #[test]
    fn witness_is_a_square_unit() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut prover = Prover::new(toy_params());
        prover.commit().unwrap();

        let x = prover.witness(&mut rng).unwrap();
        assert!(x < *prover.modulus());
        assert!(x.gcd(prover.modulus()).is_one());
        assert_eq!(prover.current_witness(), Some(&x));
        assert_eq!(prover.state(), ProverState::Challenged);
    }

    #[test]
    fn response_squares_to_witness_times_selected_basis() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut prover = Prover::new(toy_params());
        let commitment = prover.commit().unwrap();
        let x = prover.witness(&mut rng).unwrap();

        let y = prover.respond(&[true, false]).unwrap();
        let n = commitment.modulus();
        assert_eq!(
            y.modpow(&BigUint::from(2u32), n),
            (x * &commitment.public_basis()[0]) % n
        );
        assert_eq!(prover.state(), ProverState::Responded);
    }

    #[test]
    fn out_of_order_calls_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut prover = Prover::new(toy_params());

        assert!(matches!(
            prover.witness(&mut rng),
            Err(Error::StateViolation { operation: "witness", .. })
        ));
        assert!(matches!(
            prover.respond(&[false, false]),
            Err(Error::StateViolation { .. })
        ));
        assert_eq!(prover.state(), ProverState::ReadyToCommit);
        assert!(prover.current_witness().is_none());

        prover.commit().unwrap();
        assert!(matches!(prover.commit(), Err(Error::StateViolation { .. })));
        assert_eq!(prover.state(), ProverState::Committed);
    }

    #[test]
    fn wrong_challenge_length_keeps_state() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut prover = Prover::new(toy_params());
        prover.commit().unwrap();
        prover.witness(&mut rng).unwrap();

        assert!(matches!(
            prover.respond(&[true]),
            Err(Error::InvalidParams(_))
        ));
        assert_eq!(prover.state(), ProverState::Challenged);
        assert!(prover.respond(&[true, true]).is_ok());
    }

    #[test]
    fn advance_round_keeps_public_basis() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut prover = Prover::new(toy_params());
        let first = prover.commit().unwrap();
        prover.witness(&mut rng).unwrap();
        prover.respond(&[false, true]).unwrap();

        prover.advance_round();
        assert_eq!(prover.state(), ProverState::ReadyToCommit);
        assert!(prover.current_witness().is_none());
        assert_eq!(prover.commit().unwrap(), first);
    }
}

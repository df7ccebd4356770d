/// Commitment and other values exchanged in a round.
pub mod messages;
/// Prover ("Peggy") state machine.
pub mod prover;
/// Verifier ("Victor") state machine.
pub mod verifier;

pub use messages::Commitment;
pub use prover::{Prover, ProverState};
pub use verifier::{Verifier, VerifierState};

//! Feige-Fiat-Shamir zero-knowledge identification over a byte stream.
//!
//! A prover ("Peggy") convinces a verifier ("Victor") that she knows square
//! roots `S_i` of public values `V_i = S_i^2 mod N` without revealing them.
//! Each round the prover commits to `X = r^2`, the verifier picks a random
//! `k`-bit challenge `A`, and the prover answers `Y = r * prod(S_i for A_i)`.
//! An impostor survives one round with probability `2^-k`.
//!
//! - [`primitives`]: prime generation, parameter setup, randomness
//! - [`codec`]: the tagged binary frame format
//! - [`protocol`]: the prover and verifier state machines
//! - [`session`]: turn-taking between two endpoints over a [`transport`]
//! - [`runner`]: the console driver used by the `peggy` and `victor` binaries

/// Binary frame codec.
pub mod codec;
/// Error types.
pub mod error;
/// Arithmetic building blocks.
pub mod primitives;
/// Prover and verifier engines.
pub mod protocol;
/// Console driver for a session over TCP.
pub mod runner;
/// Session orchestration.
pub mod session;
/// Transport abstraction.
pub mod transport;

pub use codec::Frame;
pub use error::Error;
pub use primitives::{Parameters, SecureRng};
pub use protocol::{Commitment, Prover, ProverState, Verifier, VerifierState};
pub use session::{Event, Role, RoundSummary, Session, SessionConfig, Step};
pub use transport::{ChannelTransport, ConnectionState, Transport};

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Default cap on rejection-sampling draws.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10_000;

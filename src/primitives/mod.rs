//! Arithmetic building blocks for the Feige-Fiat-Shamir protocol.
//!
//! - **rng**: the secure randomness source
//! - **prime**: Miller-Rabin probable-prime generation
//! - **params**: modulus and secret basis setup

/// Modulus and secret basis generation.
pub mod params;
/// Probable-prime generation.
pub mod prime;
/// Cryptographically secure randomness.
pub mod rng;

pub use params::Parameters;
pub use prime::{generate_prime, is_probable_prime};
pub use rng::SecureRng;

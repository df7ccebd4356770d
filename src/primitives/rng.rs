//! Randomness source for setup and rounds.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

/// Operating-system randomness behind the `CryptoRng + RngCore` bound that
/// prime generation, basis sampling, witness nonces and challenge bits take.
///
/// Sessions own one of these. Tests pass a seeded `StdRng` to the same
/// functions instead.
#[derive(Clone, Copy, Debug)]
pub struct SecureRng(OsRng);

impl SecureRng {
    /// Wraps the OS entropy source.
    pub fn new() -> Self {
        Self(OsRng)
    }
}

impl Default for SecureRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for SecureRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl CryptoRng for SecureRng {}

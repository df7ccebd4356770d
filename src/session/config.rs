use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::primitives::params::{MAX_BASIS_LEN, MAX_PRIME_BITS};
use crate::primitives::prime::MIN_PRIME_BITS;
use crate::{Error, Result, DEFAULT_MAX_ATTEMPTS};

/// Default location of the TOML configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/ffs.toml";

/// Session configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Bit-length `l` of each prime factor of the modulus.
    pub prime_bits: u64,
    /// Number `k` of secret basis values, and of challenge bits per round.
    pub basis_len: usize,
    /// Stop after this many rounds. `None` plays until the connection closes.
    pub rounds: Option<u64>,
    /// Continue automatically after every inbound frame instead of waiting for
    /// an explicit local advance.
    pub auto_advance: bool,
    /// Cap on rejection-sampling draws for the basis and witness nonces.
    pub max_sampling_attempts: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prime_bits: 16,
            basis_len: 8,
            rounds: None,
            auto_advance: false,
            max_sampling_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl SessionConfig {
    /// Loads configuration from `.env`, a TOML file and environment variables.
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables with `FFS_` prefix (e.g., `FFS_BASIS_LEN=16`)
    /// 2. TOML configuration file (if exists)
    /// 3. Built-in defaults
    ///
    /// The `.env` file is loaded first so its entries count as environment
    /// variables. The TOML path comes from `FFS_CONFIG_PATH` and defaults to
    /// `./config/ffs.toml`; a missing file is skipped.
    ///
    /// # Environment Variable Examples
    /// ```bash
    /// FFS_PRIME_BITS=512
    /// FFS_BASIS_LEN=16
    /// FFS_ROUNDS=20
    /// FFS_AUTO_ADVANCE=true
    /// ```
    pub fn from_env() -> Result<Self> {
        // Attempt to load .env file (silently ignore if it doesn't exist)
        let _ = dotenvy::dotenv();

        let config_path =
            std::env::var("FFS_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(config_path)
    }

    /// Loads configuration from the given TOML file merged with `FFS_*`
    /// environment variables.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("FFS_").ignore(&["config_path"]))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Checks that the values describe a playable session.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_PRIME_BITS..=MAX_PRIME_BITS).contains(&self.prime_bits) {
            return Err(Error::Config(format!(
                "prime_bits must be in {MIN_PRIME_BITS}..={MAX_PRIME_BITS}, got {}",
                self.prime_bits
            )));
        }

        if !(1..=MAX_BASIS_LEN).contains(&self.basis_len) {
            return Err(Error::Config(format!(
                "basis_len must be in 1..={MAX_BASIS_LEN}, got {}",
                self.basis_len
            )));
        }

        if self.rounds == Some(0) {
            return Err(Error::Config("rounds cannot be zero".to_string()));
        }

        if self.max_sampling_attempts == 0 {
            return Err(Error::Config(
                "max_sampling_attempts cannot be zero".to_string(),
            ));
        }

        Ok(())
    }
}

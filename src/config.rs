// Configuration
// Tunables for key generation and the command line front end

use std::time::Duration;

/// Default modulus size in bits
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Public exponent used for every generated key
pub const PUBLIC_EXPONENT: u32 = 65537;

/// Parameters of the prime search used by key generation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyGenConfig {
    /// Miller-Rabin rounds per candidate
    pub miller_rabin_rounds: u32,
    /// Candidates drawn for a single prime before giving up
    pub max_prime_candidates: usize,
    /// Attempts at assembling a complete key (p, q, d) before giving up
    pub max_key_attempts: usize,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            miller_rabin_rounds: 20,
            max_prime_candidates: 100_000,
            max_key_attempts: 64,
        }
    }
}

impl KeyGenConfig {
    pub fn with_miller_rabin_rounds(mut self, rounds: u32) -> Self {
        self.miller_rabin_rounds = rounds;
        self
    }

    pub fn with_max_prime_candidates(mut self, candidates: usize) -> Self {
        self.max_prime_candidates = candidates;
        self
    }

    pub fn with_max_key_attempts(mut self, attempts: usize) -> Self {
        self.max_key_attempts = attempts;
        self
    }
}

/// Settings shared by all CLI commands
#[derive(Clone, Debug)]
pub struct CliConfig {
    /// Modulus size used by `keygen`
    pub bits: usize,
    /// Abandon key generation after this long
    pub timeout: Option<Duration>,
    /// Fallback log filter when RUST_LOG is unset
    pub log_level: String,
    pub keygen: KeyGenConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            bits: DEFAULT_KEY_BITS,
            timeout: None,
            log_level: "warn".to_string(),
            keygen: KeyGenConfig::default(),
        }
    }
}

//! Remember token generation
//!
//! Tokens are URL-safe base64 (no padding) of random bytes drawn from the OS
//! random source.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};

use crate::domain::ConfigurationError;

/// Minimum entropy of a remember token
pub const MIN_TOKEN_BYTES: usize = 16;

const DEFAULT_TOKEN_BYTES: usize = 32;

/// Generator for opaque remember tokens
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    /// Number of random bytes to generate
    token_bytes: usize,
}

impl TokenGenerator {
    /// Create a generator producing 32-byte tokens
    pub fn new() -> Self {
        Self {
            token_bytes: DEFAULT_TOKEN_BYTES,
        }
    }

    /// Set the number of random bytes, rejecting anything below 16
    pub fn with_token_bytes(bytes: usize) -> Result<Self, ConfigurationError> {
        if bytes < MIN_TOKEN_BYTES {
            return Err(ConfigurationError::TokenEntropy {
                min: MIN_TOKEN_BYTES,
                actual: bytes,
            });
        }

        Ok(Self { token_bytes: bytes })
    }

    /// Generate a new token
    pub fn generate(&self) -> String {
        let mut random_bytes = vec![0u8; self.token_bytes];
        OsRng.fill_bytes(&mut random_bytes);

        URL_SAFE_NO_PAD.encode(&random_bytes)
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}

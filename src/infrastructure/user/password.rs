//! Password hashing utilities using Argon2

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::fmt::Debug;
use thiserror::Error;

use crate::config::HashingConfig;
use crate::domain::ConfigurationError;

/// Errors raised while hashing a password
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Failed to hash password: {0}")]
pub struct HashingError(String);

impl HashingError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Trait for password hashing operations
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password into a self-describing digest with an embedded salt
    fn hash(&self, password: &str) -> Result<String, HashingError>;

    /// Verify a password against a digest
    fn verify(&self, password: &str, digest: &str) -> bool;
}

/// Argon2id password hasher
///
/// Digests are PHC strings, so the salt and cost parameters travel with the
/// digest and older digests keep verifying after the cost is raised. The
/// optional pepper is fed to Argon2 as its secret input and is not stored.
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
    pepper: Option<Vec<u8>>,
}

impl Argon2Hasher {
    /// Create a hasher with the Argon2 default cost
    pub fn new() -> Self {
        Self {
            params: Params::default(),
            pepper: None,
        }
    }

    /// Create a hasher with explicit cost parameters
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, ConfigurationError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| ConfigurationError::HashingParams(e.to_string()))?;

        Ok(Self {
            params,
            pepper: None,
        })
    }

    /// Build a hasher from configuration
    pub fn from_config(config: &HashingConfig) -> Result<Self, ConfigurationError> {
        let hasher = Self::with_params(config.memory_kib, config.iterations, config.parallelism)?;

        match config.pepper.as_deref() {
            Some(pepper) if !pepper.is_empty() => hasher.with_pepper(pepper.as_bytes()),
            _ => Ok(hasher),
        }
    }

    /// Mix a server-side secret into every hash
    pub fn with_pepper(mut self, pepper: &[u8]) -> Result<Self, ConfigurationError> {
        // Argon2 rejects oversized secrets; surface that now rather than on first hash
        Argon2::new_with_secret(pepper, Algorithm::Argon2id, Version::V0x13, self.params.clone())
            .map_err(|e| ConfigurationError::HashingParams(e.to_string()))?;

        self.pepper = Some(pepper.to_vec());
        Ok(self)
    }

    fn argon2(&self) -> Result<Argon2<'_>, argon2::Error> {
        match &self.pepper {
            Some(pepper) => Argon2::new_with_secret(
                pepper,
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            ),
            None => Ok(Argon2::new(
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )),
        }
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("memory_kib", &self.params.m_cost())
            .field("iterations", &self.params.t_cost())
            .field("parallelism", &self.params.p_cost())
            .field("peppered", &self.pepper.is_some())
            .finish()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = self.argon2().map_err(|e| HashingError(e.to_string()))?;

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HashingError(e.to_string()))
    }

    /// The digest comparison inside `verify_password` is constant-time.
    fn verify(&self, password: &str, digest: &str) -> bool {
        let parsed_hash = match PasswordHash::new(digest) {
            Ok(h) => h,
            Err(_) => return false,
        };

        match self.argon2() {
            Ok(argon2) => argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
            Err(_) => false,
        }
    }
}

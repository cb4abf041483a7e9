//! Identity core
//!
//! Validation and authentication of user identity records:
//! - Field rules for name, email and password with all violations reported
//! - Argon2id password digests with embedded salts and an optional pepper
//! - Case-insensitive email uniqueness backed by a store-side constraint
//! - Opaque remember tokens from the OS random source

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use config::AuthConfig;
use domain::{ConfigurationError, FieldValidator, RecordStore};
use infrastructure::user::{Argon2Hasher, PostgresUserStore, TokenGenerator, UserAuthenticator};
use tracing::info;

/// Build an authenticator over any record store from the auth configuration
pub fn build_authenticator<S: RecordStore>(
    config: &AuthConfig,
    store: Arc<S>,
) -> Result<UserAuthenticator<S, Argon2Hasher>, ConfigurationError> {
    let validator = FieldValidator::new(
        &config.validation.email_pattern,
        config.validation.name_max_length,
        config.validation.email_max_length,
        config.validation.password_min_length,
    )?;
    let hasher = Argon2Hasher::from_config(&config.hashing)?;
    let tokens = TokenGenerator::with_token_bytes(config.token.bytes)?;

    UserAuthenticator::with_components(store, Arc::new(hasher), validator, tokens)
}

/// Connect to PostgreSQL and build an authenticator over it
pub async fn create_authenticator(
    config: &AppConfig,
) -> anyhow::Result<UserAuthenticator<PostgresUserStore, Argon2Hasher>> {
    info!("Connecting to PostgreSQL...");
    let store = PostgresUserStore::connect(&config.database).await?;
    info!("PostgreSQL connection established");

    Ok(build_authenticator(&config.auth, Arc::new(store))?)
}

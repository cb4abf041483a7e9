//! User authenticator: registration, saving and credential checks

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::user::{
    check_uniqueness, Field, FieldErrorKind, FieldErrors, FieldValidator, RecordStore, UserRecord,
};
use crate::domain::{ConfigurationError, RegistrationError, StoreError};

use super::password::PasswordHasher;
use super::token::TokenGenerator;

/// Plaintext checked against when no record matches, so a miss costs the same
/// as a wrong password.
const DUMMY_PASSWORD: &str = "identity-core-timing-equalizer";

/// Request for registering a new user
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// `None` means the confirmation was never supplied
    pub password_confirmation: Option<String>,
}

/// Orchestrates validation, hashing and token issue against a record store
#[derive(Debug)]
pub struct UserAuthenticator<S: RecordStore, H: PasswordHasher> {
    store: Arc<S>,
    hasher: Arc<H>,
    validator: FieldValidator,
    tokens: TokenGenerator,
    /// Digest verified against when no record matches
    dummy_digest: String,
}

impl<S: RecordStore, H: PasswordHasher> UserAuthenticator<S, H> {
    /// Create an authenticator with default validation rules and tokens
    pub fn new(store: Arc<S>, hasher: Arc<H>) -> Result<Self, ConfigurationError> {
        Self::with_components(store, hasher, FieldValidator::default(), TokenGenerator::new())
    }

    /// Create an authenticator with explicit validation rules and token generator
    ///
    /// The timing-equalizer digest is hashed here so that no `authenticate`
    /// call pays for it.
    pub fn with_components(
        store: Arc<S>,
        hasher: Arc<H>,
        validator: FieldValidator,
        tokens: TokenGenerator,
    ) -> Result<Self, ConfigurationError> {
        let dummy_digest = hasher
            .hash(DUMMY_PASSWORD)
            .map_err(|e| ConfigurationError::EqualizerDigest(e.to_string()))?;

        Ok(Self {
            store,
            hasher,
            validator,
            tokens,
            dummy_digest,
        })
    }

    pub fn validator(&self) -> &FieldValidator {
        &self.validator
    }

    /// Register a new user
    ///
    /// Returns every field error at once. A unique-constraint violation raised
    /// by the store (another registration won the race) is reported as
    /// `email has already been taken`.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserRecord, RegistrationError> {
        let record = UserRecord::new(
            request.name,
            request.email,
            request.password,
            request.password_confirmation,
        );

        self.save(record).await
    }

    /// Validate and persist a new or previously stored record
    ///
    /// A supplied plaintext password is hashed into a fresh digest. The
    /// remember token is only generated on the first save. Transient password
    /// fields are cleared on success.
    pub async fn save(&self, mut record: UserRecord) -> Result<UserRecord, RegistrationError> {
        let mut errors = self.validator.validate_fields(&record);

        if !record.email().trim().is_empty() {
            let existing = self.store.find_by_email(record.email()).await?;
            errors.extend(check_uniqueness(&record, existing.as_ref()));
        }

        if !errors.is_empty() {
            debug!(
                fields = ?errors.iter().map(|e| e.field.as_str()).collect::<Vec<_>>(),
                "user record failed validation"
            );
            return Err(RegistrationError::Invalid(errors));
        }

        if let Some(password) = record.password() {
            let digest = self
                .hasher
                .hash(password)
                .map_err(|e| RegistrationError::hashing(e.to_string()))?;
            record.set_password_digest(digest);
        }

        if record.remember_token().is_none() {
            record.set_remember_token(self.tokens.generate());
        }

        let id = match self.store.save(&record).await {
            Ok(id) => id,
            Err(StoreError::ConstraintViolation { field: Field::Email }) => {
                warn!("email uniqueness violated at save time");
                return Err(already_taken());
            }
            Err(e) => {
                error!(error = %e, "failed to save user record");
                return Err(e.into());
            }
        };

        let first_save = !record.is_persisted();
        let user_id = id.to_string();
        record.assign_id(id);
        record.clear_transient();

        if first_save {
            info!(%user_id, "user registered");
        } else {
            debug!(%user_id, "user record updated");
        }

        Ok(record)
    }

    /// Check an email and password pair
    ///
    /// Returns the stored record only when the password verifies. Unknown
    /// emails, wrong passwords and store failures all yield `None`, and a
    /// digest is verified in every case to keep response times comparable.
    pub async fn authenticate(&self, email: &str, password: &str) -> Option<UserRecord> {
        let found = match self.store.find_by_email(email).await {
            Ok(found) => found,
            Err(e) => {
                error!(error = %e, "user lookup failed during authentication");
                None
            }
        };

        match found {
            Some(user) => {
                let verified = user
                    .password_digest()
                    .map(|digest| self.hasher.verify(password, digest))
                    .unwrap_or_else(|| {
                        self.verify_dummy(password);
                        false
                    });

                if verified {
                    Some(user)
                } else {
                    debug!("authentication failed");
                    None
                }
            }
            None => {
                self.verify_dummy(password);
                debug!("authentication failed");
                None
            }
        }
    }

    /// Resolve the record holding a remember token
    pub async fn find_by_remember_token(&self, token: &str) -> Option<UserRecord> {
        if token.is_empty() {
            return None;
        }

        match self.store.find_by_remember_token(token).await {
            Ok(found) => found,
            Err(e) => {
                error!(error = %e, "user lookup by remember token failed");
                None
            }
        }
    }

    /// Replace the remember token of a stored record
    ///
    /// The record goes through the same validation and uniqueness checks as
    /// `save`, so pending setter changes are never persisted unchecked.
    pub async fn regenerate_remember_token(
        &self,
        mut record: UserRecord,
    ) -> Result<UserRecord, RegistrationError> {
        if !record.is_persisted() {
            return Err(StoreError::not_found("Record has not been saved").into());
        }

        record.set_remember_token(self.tokens.generate());
        self.save(record).await
    }

    fn verify_dummy(&self, password: &str) {
        self.hasher.verify(password, &self.dummy_digest);
    }
}

fn already_taken() -> RegistrationError {
    let mut errors = FieldErrors::new();
    errors.add(Field::Email, FieldErrorKind::AlreadyTaken);
    RegistrationError::Invalid(errors)
}

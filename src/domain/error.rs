use thiserror::Error;

use super::user::{Field, FieldErrors};

/// Errors reported by a record store
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A storage-level unique constraint rejected the write
    #[error("Constraint violation on field '{field}'")]
    ConstraintViolation { field: Field },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl StoreError {
    pub fn constraint_violation(field: Field) -> Self {
        Self::ConstraintViolation { field }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

/// Errors returned when registering or saving a user record
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The record failed one or more field rules
    #[error("Validation failed: {0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Password hashing failed: {message}")]
    Hashing { message: String },
}

impl RegistrationError {
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }

    /// Field errors carried by this error, if it is a validation failure
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Errors raised while building components from configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Invalid email pattern: {0}")]
    EmailPattern(String),

    #[error("Invalid hashing parameters: {0}")]
    HashingParams(String),

    #[error("Could not prepare timing-equalizer digest: {0}")]
    EqualizerDigest(String),

    #[error("Remember tokens need at least {min} bytes of entropy, got {actual}")]
    TokenEntropy { min: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{FieldError, FieldErrorKind};

    #[test]
    fn test_store_error_display() {
        let err = StoreError::constraint_violation(Field::Email);
        assert_eq!(err.to_string(), "Constraint violation on field 'email'");

        let err = StoreError::storage("connection reset");
        assert_eq!(err.to_string(), "Storage error: connection reset");
    }

    #[test]
    fn test_registration_error_field_errors() {
        let errors: FieldErrors = [FieldError::new(Field::Name, FieldErrorKind::Blank)]
            .into_iter()
            .collect();
        let err = RegistrationError::Invalid(errors);

        let carried = err.field_errors().unwrap();
        assert!(carried.contains(Field::Name, FieldErrorKind::Blank));
        assert!(err.to_string().contains("name can't be blank"));
    }

    #[test]
    fn test_registration_error_from_store() {
        let err: RegistrationError = StoreError::storage("down").into();
        assert!(err.field_errors().is_none());
        assert_eq!(err.to_string(), "Storage error: down");
    }
}

//! User domain
//!
//! This module provides domain types and traits for user identity records,
//! including the record entity, field validation, and the record store trait.

mod entity;
mod repository;
mod validation;

pub use entity::{normalize_email, UserId, UserRecord};
pub use repository::RecordStore;
pub use validation::{
    check_uniqueness, Field, FieldError, FieldErrorKind, FieldErrors, FieldValidator,
    DEFAULT_EMAIL_MAX_LENGTH, DEFAULT_EMAIL_PATTERN, DEFAULT_NAME_MAX_LENGTH,
    DEFAULT_PASSWORD_MIN_LENGTH,
};

#[cfg(test)]
pub use repository::MockRecordStore;

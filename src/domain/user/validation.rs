//! Field rules for user records
//!
//! Every rule is checked independently and all violations are collected, so a
//! caller can show every problem with a candidate at once.

use std::collections::BTreeSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entity::UserRecord;
use crate::domain::error::ConfigurationError;

/// Default address grammar: `local@label(.label)*.tld`.
///
/// The local part allows letters, digits, `_`, `+`, `-` and `.`. Domain labels
/// allow letters, digits and `-`, and the final label is letters only. Classes
/// are ASCII-only; case-insensitive Unicode matching would admit characters
/// such as U+212A that lowercase differently across systems.
pub const DEFAULT_EMAIL_PATTERN: &str =
    r"^[A-Za-z0-9_+.\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]+$";

pub const DEFAULT_NAME_MAX_LENGTH: usize = 50;
/// Matches the `email VARCHAR(255)` column
pub const DEFAULT_EMAIL_MAX_LENGTH: usize = 255;
pub const DEFAULT_PASSWORD_MIN_LENGTH: usize = 6;

/// Record field a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Password,
    PasswordConfirmation,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
            Self::PasswordConfirmation => "password_confirmation",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of rule violation
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    #[error("can't be blank")]
    Blank,

    #[error("is too long")]
    TooLong,

    #[error("is invalid")]
    InvalidFormat,

    #[error("has already been taken")]
    AlreadyTaken,

    #[error("is too short")]
    TooShort,

    #[error("doesn't match confirmation")]
    ConfirmationMismatch,
}

/// A single rule violation on a single field
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[error("{field} {kind}")]
pub struct FieldError {
    pub field: Field,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(field: Field, kind: FieldErrorKind) -> Self {
        Self { field, kind }
    }
}

/// Set of rule violations for one candidate record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeSet<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: Field, kind: FieldErrorKind) {
        self.0.insert(FieldError::new(field, kind));
    }

    pub fn contains(&self, field: Field, kind: FieldErrorKind) -> bool {
        self.0.contains(&FieldError::new(field, kind))
    }

    /// Violations recorded for a single field
    pub fn on(&self, field: Field) -> Vec<FieldErrorKind> {
        self.0
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.kind)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn extend(&mut self, other: FieldErrors) {
        self.0.extend(other.0);
    }
}

impl FromIterator<FieldError> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FieldErrors {
    type Item = FieldError;
    type IntoIter = std::collections::btree_set::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        f.write_str(&messages.join(", "))
    }
}

/// Field validation rules
///
/// Holds the compiled email grammar and the length limits. Validation never
/// touches the candidate or any store.
#[derive(Debug, Clone)]
pub struct FieldValidator {
    email_pattern: Regex,
    name_max_length: usize,
    email_max_length: usize,
    password_min_length: usize,
}

impl FieldValidator {
    /// Create a validator with a custom email grammar and limits
    pub fn new(
        email_pattern: &str,
        name_max_length: usize,
        email_max_length: usize,
        password_min_length: usize,
    ) -> Result<Self, ConfigurationError> {
        let email_pattern =
            Regex::new(email_pattern).map_err(|e| ConfigurationError::EmailPattern(e.to_string()))?;

        Ok(Self {
            email_pattern,
            name_max_length,
            email_max_length,
            password_min_length,
        })
    }

    /// Validate every field rule, including email uniqueness against `existing`
    ///
    /// `existing` is the stored record whose email matches the candidate's
    /// case-insensitively, if any.
    pub fn validate(&self, candidate: &UserRecord, existing: Option<&UserRecord>) -> FieldErrors {
        let mut errors = self.validate_fields(candidate);
        errors.extend(check_uniqueness(candidate, existing));
        errors
    }

    /// Validate the name, email format and password rules
    pub fn validate_fields(&self, candidate: &UserRecord) -> FieldErrors {
        let mut errors = FieldErrors::new();

        self.validate_name(candidate.name(), &mut errors);
        self.validate_email(candidate.email(), &mut errors);

        // Records loaded from a store carry no plaintext; password rules only
        // apply when the record still needs a digest or a new one was supplied.
        if candidate.password().is_some() || candidate.password_digest().is_none() {
            self.validate_password(
                candidate.password(),
                candidate.password_confirmation(),
                &mut errors,
            );
        }

        errors
    }

    /// Check an address against the configured grammar
    pub fn is_valid_email(&self, email: &str) -> bool {
        self.email_pattern.is_match(email)
    }

    fn validate_name(&self, name: &str, errors: &mut FieldErrors) {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            errors.add(Field::Name, FieldErrorKind::Blank);
        }

        if trimmed.chars().count() > self.name_max_length {
            errors.add(Field::Name, FieldErrorKind::TooLong);
        }
    }

    fn validate_email(&self, email: &str, errors: &mut FieldErrors) {
        if email.trim().is_empty() {
            errors.add(Field::Email, FieldErrorKind::Blank);
        }

        if email.chars().count() > self.email_max_length {
            errors.add(Field::Email, FieldErrorKind::TooLong);
        }

        if !self.is_valid_email(email) {
            errors.add(Field::Email, FieldErrorKind::InvalidFormat);
        }
    }

    fn validate_password(
        &self,
        password: Option<&str>,
        confirmation: Option<&str>,
        errors: &mut FieldErrors,
    ) {
        let password = password.unwrap_or("");

        if password.trim().is_empty() {
            errors.add(Field::Password, FieldErrorKind::Blank);
        }

        if password.chars().count() < self.password_min_length {
            errors.add(Field::Password, FieldErrorKind::TooShort);
        }

        match confirmation {
            Some(confirmation) if confirmation == password => {}
            _ => errors.add(Field::PasswordConfirmation, FieldErrorKind::ConfirmationMismatch),
        }
    }
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self {
            email_pattern: DEFAULT_EMAIL_REGEX.clone(),
            name_max_length: DEFAULT_NAME_MAX_LENGTH,
            email_max_length: DEFAULT_EMAIL_MAX_LENGTH,
            password_min_length: DEFAULT_PASSWORD_MIN_LENGTH,
        }
    }
}

static DEFAULT_EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_EMAIL_PATTERN).unwrap());

/// Email uniqueness rule
///
/// Fails when a stored record with the same (case-insensitive) email exists
/// and is not the candidate itself.
pub fn check_uniqueness(candidate: &UserRecord, existing: Option<&UserRecord>) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if let Some(existing) = existing {
        let same_record = match (candidate.id(), existing.id()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };

        if !same_record && existing.normalized_email() == candidate.normalized_email() {
            errors.add(Field::Email, FieldErrorKind::AlreadyTaken);
        }
    }

    errors
}

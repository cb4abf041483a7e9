//! Domain layer - Core identity rules and entities

pub mod error;
pub mod user;

pub use error::{ConfigurationError, RegistrationError, StoreError};
pub use user::{
    Field, FieldError, FieldErrorKind, FieldErrors, FieldValidator, RecordStore, UserId,
    UserRecord,
};

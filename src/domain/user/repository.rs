//! Record store trait

use async_trait::async_trait;

use super::entity::{UserId, UserRecord};
use crate::domain::error::StoreError;

#[cfg(test)]
use mockall::automock;

/// Storage collaborator for user records
///
/// Implementations must enforce email uniqueness themselves (case-insensitively)
/// and report a clash from `save` as `StoreError::ConstraintViolation`. The
/// application-level check in the validator is only a fast pre-check.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Find a record whose email matches case-insensitively
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Find a record by its remember token
    async fn find_by_remember_token(&self, token: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Insert a new record (no id) or update an existing one
    ///
    /// Returns the id of the stored record, assigning one on insert.
    async fn save(&self, record: &UserRecord) -> Result<UserId, StoreError>;
}

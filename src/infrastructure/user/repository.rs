//! In-memory record store implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{normalize_email, Field, RecordStore, UserId, UserRecord};
use crate::domain::StoreError;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, UserRecord>,
    /// Normalized email -> user ID; acts as the unique index
    email_index: HashMap<String, UserId>,
    /// Remember token -> user ID
    token_index: HashMap<String, UserId>,
}

/// In-memory implementation of RecordStore
///
/// All tables sit behind one lock so the uniqueness check and the insert are a
/// single atomic step.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryUserStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RecordStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables.read().await;

        Ok(tables
            .email_index
            .get(&normalize_email(email))
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn find_by_remember_token(&self, token: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables.read().await;

        Ok(tables
            .token_index
            .get(token)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn save(&self, record: &UserRecord) -> Result<UserId, StoreError> {
        let mut tables = self.tables.write().await;
        let email_key = record.normalized_email();

        let id = match record.id() {
            Some(id) => {
                if !tables.users.contains_key(id) {
                    return Err(StoreError::not_found(format!("User '{}' not found", id)));
                }
                id.clone()
            }
            None => UserId::generate(),
        };

        if let Some(owner) = tables.email_index.get(&email_key) {
            if *owner != id {
                return Err(StoreError::constraint_violation(Field::Email));
            }
        }

        let mut stored = record.clone();
        stored.assign_id(id.clone());
        stored.clear_transient();

        // Drop index entries of the previous version of this record
        if let Some(previous) = tables.users.get(&id).cloned() {
            tables.email_index.remove(&previous.normalized_email());
            if let Some(token) = previous.remember_token() {
                tables.token_index.remove(token);
            }
        }

        tables.email_index.insert(email_key, id.clone());
        if let Some(token) = stored.remember_token() {
            tables.token_index.insert(token.to_string(), id.clone());
        }
        tables.users.insert(id.clone(), stored);

        Ok(id)
    }
}

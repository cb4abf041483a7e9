//! PostgreSQL record store implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::domain::user::{Field, RecordStore, UserId, UserRecord};
use crate::domain::StoreError;

/// Name of the unique index on `lower(email)`
const EMAIL_UNIQUE_INDEX: &str = "users_email_lower_key";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL,
        password_digest TEXT NOT NULL,
        remember_token TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS users_email_lower_key ON users (lower(email))",
    "CREATE INDEX IF NOT EXISTS users_remember_token_idx ON users (remember_token)",
];

/// PostgreSQL implementation of RecordStore
///
/// Email uniqueness is enforced by a unique index on `lower(email)`, so two
/// racing inserts cannot both commit.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Create a new store with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect using the database configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| StoreError::storage(format!("Failed to connect: {}", e)))?;

        Ok(Self::new(pool))
    }

    /// Create the users table and its indexes if missing
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::storage(format!("Failed to migrate: {}", e)))?;
        }

        debug!("users schema is up to date");
        Ok(())
    }

    async fn insert(&self, id: Uuid, record: &UserRecord) -> Result<(), StoreError> {
        let (digest, token) = persisted_secrets(record)?;

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_digest, remember_token,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(record.name())
        .bind(record.email())
        .bind(digest)
        .bind(token)
        .bind(record.created_at())
        .bind(record.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "create"))?;

        Ok(())
    }

    async fn update(&self, id: &UserId, record: &UserRecord) -> Result<(), StoreError> {
        let (digest, token) = persisted_secrets(record)?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_digest = $4, remember_token = $5,
                updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(record.name())
        .bind(record.email())
        .bind(digest)
        .bind(token)
        .bind(record.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "update"))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(format!("User '{}' not found", id)));
        }

        Ok(())
    }
}

#[async_trait]
impl RecordStore for PostgresUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_digest, remember_token, created_at, updated_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::storage(format!("Failed to get user by email: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_remember_token(&self, token: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_digest, remember_token, created_at, updated_at
            FROM users
            WHERE remember_token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::storage(format!("Failed to get user by token: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn save(&self, record: &UserRecord) -> Result<UserId, StoreError> {
        match record.id() {
            Some(id) => {
                self.update(id, record).await?;
                Ok(id.clone())
            }
            None => {
                let id = Uuid::new_v4();
                self.insert(id, record).await?;
                Ok(UserId::new(id))
            }
        }
    }
}

fn persisted_secrets(record: &UserRecord) -> Result<(&str, &str), StoreError> {
    match (record.password_digest(), record.remember_token()) {
        (Some(digest), Some(token)) => Ok((digest, token)),
        _ => Err(StoreError::storage(
            "Record must carry a password digest and remember token before it is stored",
        )),
    }
}

fn map_write_error(e: sqlx::Error, action: &str) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some(EMAIL_UNIQUE_INDEX) | None => StoreError::constraint_violation(Field::Email),
                Some(other) => StoreError::storage(format!(
                    "Failed to {} user: unique constraint '{}' violated",
                    action, other
                )),
            };
        }
    }

    StoreError::storage(format!("Failed to {} user: {}", action, e))
}

fn row_to_user(row: &PgRow) -> Result<UserRecord, StoreError> {
    let map_err = |e: sqlx::Error| StoreError::storage(format!("Failed to read user row: {}", e));

    let id: Uuid = row.try_get("id").map_err(map_err)?;
    let name: String = row.try_get("name").map_err(map_err)?;
    let email: String = row.try_get("email").map_err(map_err)?;
    let password_digest: String = row.try_get("password_digest").map_err(map_err)?;
    let remember_token: String = row.try_get("remember_token").map_err(map_err)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(map_err)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(map_err)?;

    Ok(UserRecord::from_stored(
        UserId::new(id),
        name,
        email,
        password_digest,
        remember_token,
        created_at,
        updated_at,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_secrets_required() {
        let user = UserRecord::new("Example", "a@b.com", "foobar", Some("foobar"));
        assert!(matches!(
            persisted_secrets(&user),
            Err(StoreError::Storage { .. })
        ));
    }

    #[test]
    fn test_map_non_database_error() {
        let err = map_write_error(sqlx::Error::PoolTimedOut, "create");
        assert!(matches!(err, StoreError::Storage { .. }));
        assert!(err.to_string().contains("Failed to create user"));
    }

    #[test]
    fn test_schema_declares_email_index() {
        assert!(SCHEMA.iter().any(|s| s.contains(EMAIL_UNIQUE_INDEX)));
    }
}

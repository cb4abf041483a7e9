//! User record entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Wrap an existing identifier
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User identity record
///
/// `password` and `password_confirmation` are transient: they are never
/// serialized and are cleared once the record has been saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Assigned by the store on first save
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<UserId>,
    name: String,
    /// Kept as entered; uniqueness uses `normalized_email`
    email: String,
    /// Argon2 PHC string - never exposed in serialization
    #[serde(skip_serializing)]
    password_digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    remember_token: Option<String>,
    #[serde(skip)]
    password: Option<String>,
    #[serde(skip)]
    password_confirmation: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create an unsaved record from the registration fields
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        password_confirmation: Option<impl Into<String>>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            password_digest: None,
            remember_token: None,
            password: Some(password.into()),
            password_confirmation: password_confirmation.map(Into::into),
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a persisted record from stored columns
    pub fn from_stored(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        password_digest: impl Into<String>,
        remember_token: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            email: email.into(),
            password_digest: Some(password_digest.into()),
            remember_token: Some(remember_token.into()),
            password: None,
            password_confirmation: None,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> Option<&UserId> {
        self.id.as_ref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Lowercased, trimmed email used for uniqueness
    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }

    pub fn password_digest(&self) -> Option<&str> {
        self.password_digest.as_deref()
    }

    pub fn remember_token(&self) -> Option<&str> {
        self.remember_token.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn password_confirmation(&self) -> Option<&str> {
        self.password_confirmation.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    // Mutators

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
        self.touch();
    }

    /// Supply a new plaintext password; it is hashed on the next save
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = Some(password.into());
        self.touch();
    }

    pub fn set_password_confirmation(&mut self, confirmation: Option<impl Into<String>>) {
        self.password_confirmation = confirmation.map(Into::into);
        self.touch();
    }

    pub(crate) fn set_password_digest(&mut self, digest: String) {
        self.password_digest = Some(digest);
    }

    pub(crate) fn set_remember_token(&mut self, token: String) {
        self.remember_token = Some(token);
    }

    pub(crate) fn assign_id(&mut self, id: UserId) {
        self.id = Some(id);
    }

    pub(crate) fn clear_transient(&mut self) {
        self.password = None;
        self.password_confirmation = None;
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Normalize an email for case-insensitive comparison
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user() -> UserRecord {
        UserRecord::new("Example User", "User@Example.com", "foobar", Some("foobar"))
    }

    #[test]
    fn test_new_record_is_unsaved() {
        let user = create_test_user();

        assert!(user.id().is_none());
        assert!(!user.is_persisted());
        assert!(user.password_digest().is_none());
        assert!(user.remember_token().is_none());
        assert_eq!(user.password(), Some("foobar"));
        assert_eq!(user.password_confirmation(), Some("foobar"));
    }

    #[test]
    fn test_email_preserved_verbatim() {
        let user = create_test_user();

        assert_eq!(user.email(), "User@Example.com");
        assert_eq!(user.normalized_email(), "user@example.com");
    }

    #[test]
    fn test_absent_confirmation() {
        let user = UserRecord::new("Example", "a@b.com", "foobar", None::<String>);
        assert!(user.password_confirmation().is_none());
    }

    #[test]
    fn test_setters_touch_updated_at() {
        let mut user = create_test_user();
        let original_updated = user.updated_at();

        // Small delay to ensure timestamp differs
        std::thread::sleep(std::time::Duration::from_millis(10));

        user.set_name("New Name");
        assert_eq!(user.name(), "New Name");
        assert!(user.updated_at() > original_updated);
    }

    #[test]
    fn test_clear_transient() {
        let mut user = create_test_user();
        user.clear_transient();

        assert!(user.password().is_none());
        assert!(user.password_confirmation().is_none());
    }

    #[test]
    fn test_from_stored() {
        let id = UserId::generate();
        let now = Utc::now();
        let user = UserRecord::from_stored(id.clone(), "Stored", "s@x.io", "digest", "token", now, now);

        assert_eq!(user.id(), Some(&id));
        assert_eq!(user.password_digest(), Some("digest"));
        assert_eq!(user.remember_token(), Some("token"));
        assert!(user.password().is_none());
    }

    #[test]
    fn test_serialization_excludes_secrets() {
        let mut user = create_test_user();
        user.set_password_digest("hashed_password".to_string());

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("password_digest"));
        assert!(!json.contains("foobar"));
    }

    #[test]
    fn test_user_id_parse_roundtrip() {
        let id = UserId::generate();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }
}

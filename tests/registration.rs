//! End-to-end registration and authentication against the in-memory store

use std::sync::Arc;

use identity_core::build_authenticator;
use identity_core::config::AuthConfig;
use identity_core::domain::{Field, FieldErrorKind, RecordStore, RegistrationError};
use identity_core::infrastructure::user::{
    Argon2Hasher, InMemoryUserStore, PasswordHasher, RegisterRequest, UserAuthenticator,
};

fn fast_config() -> AuthConfig {
    let mut config = AuthConfig::default();
    config.hashing.memory_kib = 8;
    config.hashing.iterations = 1;
    config.hashing.parallelism = 1;
    config
}

fn create_service(
    store: Arc<InMemoryUserStore>,
) -> UserAuthenticator<InMemoryUserStore, Argon2Hasher> {
    build_authenticator(&fast_config(), store).unwrap()
}

fn request(email: &str) -> RegisterRequest {
    RegisterRequest {
        name: "Example User".to_string(),
        email: email.to_string(),
        password: "foobar".to_string(),
        password_confirmation: Some("foobar".to_string()),
    }
}

#[tokio::test]
async fn test_register_then_authenticate() {
    let store = Arc::new(InMemoryUserStore::new());
    let service = create_service(store.clone());

    let user = service.register(request("User@Example.com")).await.unwrap();
    assert!(user.remember_token().is_some_and(|t| !t.trim().is_empty()));
    assert_ne!(user.password_digest(), Some("foobar"));

    let stored = store.find_by_email("user@example.com").await.unwrap().unwrap();
    assert_eq!(stored.email(), "User@Example.com");
    assert_eq!(stored.remember_token(), user.remember_token());

    let found = service.authenticate("user@example.com", "foobar").await.unwrap();
    assert_eq!(found.id(), user.id());
    assert!(service.authenticate("user@example.com", "foobaz").await.is_none());
}

#[tokio::test]
async fn test_case_variant_email_is_taken() {
    let store = Arc::new(InMemoryUserStore::new());
    let service = create_service(store.clone());

    service.register(request("user@example.com")).await.unwrap();

    let result = service.register(request("USER@EXAMPLE.COM")).await;
    let errors = match result {
        Err(RegistrationError::Invalid(errors)) => errors,
        other => panic!("expected validation errors, got {:?}", other),
    };

    assert!(errors.contains(Field::Email, FieldErrorKind::AlreadyTaken));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_concurrent_registrations_same_email() {
    let store = Arc::new(InMemoryUserStore::new());
    let service = Arc::new(create_service(store.clone()));

    let handles: Vec<_> = ["race@example.com", "RACE@example.com", "Race@Example.com", "race@EXAMPLE.com"]
        .into_iter()
        .map(|email| {
            let service = service.clone();
            tokio::spawn(async move { service.register(request(email)).await })
        })
        .collect();

    let mut registered = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => registered += 1,
            Err(RegistrationError::Invalid(errors)) => {
                assert_eq!(errors.on(Field::Email), vec![FieldErrorKind::AlreadyTaken]);
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(registered, 1);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_custom_rules_from_config() {
    let mut config = fast_config();
    config.validation.password_min_length = 10;

    let service = build_authenticator(&config, Arc::new(InMemoryUserStore::new())).unwrap();

    let result = service.register(request("user@example.com")).await;
    assert!(matches!(
        result,
        Err(RegistrationError::Invalid(ref errors)) if errors.contains(Field::Password, FieldErrorKind::TooShort)
    ));
}

#[test]
fn test_password_round_trip() {
    let hasher = Argon2Hasher::with_params(8, 1, 1).unwrap();

    for password in ["foobar", "pässwörd", "with spaces", "0123456789abcdef"] {
        let digest = hasher.hash(password).unwrap();
        assert!(hasher.verify(password, &digest));
        assert!(!hasher.verify(&format!("{password}x"), &digest));
    }
}

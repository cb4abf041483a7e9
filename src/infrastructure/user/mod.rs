//! User infrastructure module
//!
//! This module provides implementations for user registration and
//! authentication, including password hashing with Argon2, remember token
//! generation, in-memory and PostgreSQL record stores, and the authenticator.

mod password;
mod postgres_repository;
mod repository;
mod service;
mod token;

pub use password::{Argon2Hasher, HashingError, PasswordHasher};
pub use postgres_repository::PostgresUserStore;
pub use repository::InMemoryUserStore;
pub use service::{RegisterRequest, UserAuthenticator};
pub use token::{TokenGenerator, MIN_TOKEN_BYTES};

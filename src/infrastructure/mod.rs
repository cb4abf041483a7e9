//! Infrastructure layer - hashing, tokens, stores and logging

pub mod logging;
pub mod user;

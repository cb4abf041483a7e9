//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, DatabaseConfig, HashingConfig, LogFormat, LoggingConfig, TokenConfig,
    ValidationConfig,
};

use serde::Deserialize;

use crate::domain::user::{
    DEFAULT_EMAIL_MAX_LENGTH, DEFAULT_EMAIL_PATTERN, DEFAULT_NAME_MAX_LENGTH,
    DEFAULT_PASSWORD_MIN_LENGTH,
};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Identity rules, hashing cost and token size
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub validation: ValidationConfig,
    pub hashing: HashingConfig,
    pub token: TokenConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub name_max_length: usize,
    pub email_max_length: usize,
    pub password_min_length: usize,
    pub email_pattern: String,
}

/// Argon2id cost parameters and optional pepper
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
    pub pepper: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub bytes: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/identity".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            name_max_length: DEFAULT_NAME_MAX_LENGTH,
            email_max_length: DEFAULT_EMAIL_MAX_LENGTH,
            password_min_length: DEFAULT_PASSWORD_MIN_LENGTH,
            email_pattern: DEFAULT_EMAIL_PATTERN.to_string(),
        }
    }
}

impl Default for HashingConfig {
    fn default() -> Self {
        // Argon2id defaults: 19 MiB, 2 passes, 1 lane
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
            pepper: None,
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self { bytes: 32 }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

//! CLI module for the identity core
//!
//! Provides operator subcommands against the configured PostgreSQL store:
//! - `register`: validate and store a new user
//! - `authenticate`: check an email and password pair
//! - `migrate`: create the users table and its indexes

pub mod authenticate;
pub mod migrate;
pub mod register;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Identity core - user registration and authentication
#[derive(Parser)]
#[command(name = "identity-core")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register a new user
    Register(register::RegisterArgs),

    /// Check credentials and print the matching user
    Authenticate(authenticate::AuthenticateArgs),

    /// Create the users schema
    Migrate,
}

/// Load `.env`, the layered configuration, and install logging
fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging)?;

    Ok(config)
}

//! Register command - validates and stores a new user

use clap::Args;

use crate::domain::RegistrationError;
use crate::infrastructure::user::RegisterRequest;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Email address
    #[arg(long)]
    pub email: String,

    /// Plaintext password
    #[arg(long)]
    pub password: String,

    /// Password confirmation; omitted means not supplied
    #[arg(long)]
    pub password_confirmation: Option<String>,
}

impl From<RegisterArgs> for RegisterRequest {
    fn from(args: RegisterArgs) -> Self {
        Self {
            name: args.name,
            email: args.email,
            password: args.password,
            password_confirmation: args.password_confirmation,
        }
    }
}

/// Run the register command
pub async fn run(args: RegisterArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let authenticator = crate::create_authenticator(&config).await?;

    match authenticator.register(args.into()).await {
        Ok(user) => {
            println!("{}", serde_json::to_string_pretty(&user)?);
            Ok(())
        }
        Err(RegistrationError::Invalid(errors)) => {
            for error in errors.iter() {
                eprintln!("{}", error);
            }
            anyhow::bail!("registration rejected with {} error(s)", errors.len())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;

    #[test]
    fn test_parse_register_without_confirmation() {
        let cli = Cli::try_parse_from([
            "identity-core",
            "register",
            "--name",
            "Example User",
            "--email",
            "user@example.com",
            "--password",
            "foobar",
        ])
        .unwrap();

        let Command::Register(args) = cli.command else {
            panic!("expected register command");
        };

        let request: RegisterRequest = args.into();
        assert_eq!(request.name, "Example User");
        assert!(request.password_confirmation.is_none());
    }

    #[test]
    fn test_parse_register_with_empty_confirmation() {
        let cli = Cli::try_parse_from([
            "identity-core",
            "register",
            "--name",
            "Example User",
            "--email",
            "user@example.com",
            "--password",
            "foobar",
            "--password-confirmation",
            "",
        ])
        .unwrap();

        let Command::Register(args) = cli.command else {
            panic!("expected register command");
        };

        assert_eq!(args.password_confirmation.as_deref(), Some(""));
    }
}

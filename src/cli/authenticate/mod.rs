//! Authenticate command - checks an email and password pair

use clap::Args;

#[derive(Args, Debug)]
pub struct AuthenticateArgs {
    /// Email address
    #[arg(long)]
    pub email: String,

    /// Plaintext password
    #[arg(long)]
    pub password: String,
}

/// Run the authenticate command
pub async fn run(args: AuthenticateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap()?;
    let authenticator = crate::create_authenticator(&config).await?;

    match authenticator.authenticate(&args.email, &args.password).await {
        Some(user) => {
            println!("{}", serde_json::to_string_pretty(&user)?);
            Ok(())
        }
        None => anyhow::bail!("invalid email or password"),
    }
}

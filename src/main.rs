use clap::Parser;
use identity_core::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Register(args) => cli::register::run(args).await,
        Command::Authenticate(args) => cli::authenticate::run(args).await,
        Command::Migrate => cli::migrate::run().await,
    }
}

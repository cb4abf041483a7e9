//! Migrate command - creates the users schema

use tracing::info;

use crate::infrastructure::user::PostgresUserStore;

/// Run the migrate command
pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap()?;

    let store = PostgresUserStore::connect(&config.database).await?;
    store.migrate().await?;

    info!("users schema migrated");
    Ok(())
}

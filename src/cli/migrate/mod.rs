//! Migrate command - creates the database schema and exits

use clap::Args;
use tracing::info;

use crate::infrastructure::storage::SqliteMigrator;

#[derive(Args, Debug, Default)]
pub struct MigrateArgs {
    /// Database URL, overriding `database.url`
    #[arg(long)]
    pub database_url: Option<String>,
}

pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let mut config = super::bootstrap();

    if let Some(url) = args.database_url {
        config.database.url = url;
    }

    let pool = crate::connect_and_migrate(&config).await?;
    let version = SqliteMigrator::new(pool.clone()).current_version().await?;

    info!(version = ?version, "Migrations complete");
    pool.close().await;

    Ok(())
}

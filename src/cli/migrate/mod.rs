//! Migrate command - applies the PostgreSQL schema

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::storage::{
    connect, revert_latest_migration, run_storage_migrations, StorageConfig,
};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Revert the latest applied migration instead
    #[arg(long)]
    pub revert: bool,
}

/// Run migrations against the configured database
pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    let StorageConfig::Postgres(pg_config) = config.storage_config()? else {
        anyhow::bail!("Migrations require the postgres storage backend");
    };

    let pool = connect(&pg_config).await?;

    if args.revert {
        match revert_latest_migration(&pool).await? {
            Some(version) => info!(version, "Migration reverted"),
            None => info!("Nothing to revert"),
        }
    } else {
        run_storage_migrations(&pool).await?;
    }

    pool.close().await;
    Ok(())
}

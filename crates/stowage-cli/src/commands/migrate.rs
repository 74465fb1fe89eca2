//! Metadata schema migration command.

use crate::output;
use stowage_core::config::AppConfig;
use stowage_core::result::AppResult;

/// Run all pending migrations
pub async fn execute(config: &AppConfig) -> AppResult<()> {
    let pool = super::create_db_pool(config).await?;

    eprintln!("Running database migrations...");
    stowage_database::migration::run_migrations(pool.pool()).await?;
    pool.close().await;

    output::print_success("All migrations applied.");
    Ok(())
}

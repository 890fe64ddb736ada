use anyhow::{Context, Result};
use top_movers_core::AppConfig;
use top_movers_data::DatabaseClient;

/// Applies the embedded schema migrations.
///
/// # Errors
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run_migrate(config: &AppConfig) -> Result<()> {
    let mut database = config.database.clone();
    database.run_migrations = false;

    let db = DatabaseClient::connect(&database)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to apply migrations")?;

    tracing::info!("Migrations up to date");
    Ok(())
}

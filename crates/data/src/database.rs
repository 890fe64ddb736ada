use sqlx::{postgres::PgPoolOptions, PgPool};
use top_movers_core::DatabaseConfig;

use crate::repositories::WinnerRepository;
use crate::store::Result;

pub struct DatabaseClient {
    pool: PgPool,
}

impl DatabaseClient {
    /// Creates a new database client connected to the configured `PostgreSQL` database.
    ///
    /// # Errors
    /// Returns an error if the connection cannot be established or, when
    /// enabled, the migrations fail.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        let client = Self { pool };
        if config.run_migrations {
            client.migrate().await?;
        }
        Ok(client)
    }

    /// Applies the embedded migrations.
    ///
    /// # Errors
    /// Returns an error if a migration fails to apply.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    #[must_use]
    pub fn winners(&self) -> WinnerRepository {
        WinnerRepository::new(self.pool.clone())
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

//! HTTP retrieval server command.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use top_movers_core::AppConfig;
use top_movers_data::DatabaseClient;
use top_movers_web_api::{ApiServer, RetrievalProjector};

/// Arguments for the serve command.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Listen address, overriding `server.host` and `server.port`
    #[arg(short, long)]
    pub addr: Option<String>,
}

/// Serves `GET /movers` until the process is stopped.
///
/// # Errors
/// Returns an error if the database is unreachable or the listener fails.
pub async fn run_serve(config: &AppConfig, args: &ServeArgs) -> Result<()> {
    let addr = args.addr.clone().unwrap_or_else(|| config.server_addr());
    tracing::info!("Starting retrieval API on {}", addr);

    let db = DatabaseClient::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    let projector =
        RetrievalProjector::from_config(Arc::new(db.winners()), &config.ingestion, &config.retrieval);

    ApiServer::new(Arc::new(projector)).serve(&addr).await
}

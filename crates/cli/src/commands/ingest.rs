//! Ingest and backfill commands.
//!
//! Both print JSON reports to stdout and return an error (non-zero exit)
//! on any failed run.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use top_movers_core::AppConfig;
use top_movers_data::DatabaseClient;
use top_movers_ingestion::{IngestionOrchestrator, IngestionReport};
use top_movers_market_data::{DailyQuoteFetcher, PacedClient};

/// Arguments for the backfill command.
#[derive(Args, Debug, Clone)]
pub struct BackfillArgs {
    /// Last trading date to consider (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: NaiveDate,

    /// Number of trading days to ingest
    #[arg(long, default_value = "7")]
    pub days: usize,
}

/// Wires the provider client, store, and orchestrator from configuration.
async fn build_orchestrator(config: &AppConfig) -> Result<IngestionOrchestrator> {
    let client = PacedClient::new(&config.provider, &config.pacing)
        .context("Failed to create provider client")?;
    let fetcher = Arc::new(DailyQuoteFetcher::new(client));

    let db = DatabaseClient::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    let store = Arc::new(db.winners());

    IngestionOrchestrator::new(fetcher, store, &config.ingestion)
        .context("Failed to create ingestion orchestrator")
}

fn print_report(report: &IngestionReport) -> Result<()> {
    let json = serde_json::to_string(report).context("Failed to serialize report")?;
    println!("{json}");
    Ok(())
}

/// Runs one ingestion for the most recent trading day.
///
/// # Errors
/// Returns an error if setup fails or the run does not end stored or cached.
pub async fn run_ingest(config: &AppConfig) -> Result<()> {
    let orchestrator = build_orchestrator(config).await?;
    tracing::info!(
        "Ingesting latest trading day for {} tickers",
        orchestrator.watchlist().len()
    );

    let report = orchestrator.run().await.context("Ingestion failed")?;
    print_report(&report)
}

/// Backfills the last `days` trading dates up to `end_date`.
///
/// # Errors
/// Returns an error if setup fails, too few trading dates exist, or any
/// date's run fails.
pub async fn run_backfill(config: &AppConfig, args: &BackfillArgs) -> Result<()> {
    let orchestrator = build_orchestrator(config).await?;
    tracing::info!(
        "Backfilling {} trading days up to {}",
        args.days,
        args.end_date
    );

    let reports = orchestrator
        .backfill(args.end_date, args.days)
        .await
        .context("Backfill failed")?;

    for report in &reports {
        print_report(report)?;
    }
    tracing::info!(
        "Backfill complete: {} stored, {} already present",
        reports.iter().filter(|r| r.stored).count(),
        reports.iter().filter(|r| r.cached).count()
    );
    Ok(())
}

use clap::{Parser, Subcommand};

mod commands;

use commands::{BackfillArgs, ServeArgs};

#[derive(Parser, Debug)]
#[command(name = "top-movers")]
#[command(about = "Daily top mover ingestion and retrieval", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest the most recent trading day and print the report as JSON
    Ingest,
    /// Ingest the trading days up to an end date, oldest first
    Backfill(BackfillArgs),
    /// Serve GET /movers
    Serve(ServeArgs),
    /// Apply database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries JSON reports only
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = top_movers_core::ConfigLoader::load_from(&cli.config)?;

    match cli.command {
        Commands::Ingest => commands::run_ingest(&config).await?,
        Commands::Backfill(args) => commands::run_backfill(&config, &args).await?,
        Commands::Serve(args) => commands::run_serve(&config, &args).await?,
        Commands::Migrate => commands::run_migrate(&config).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_backfill_defaults() {
        let cli = Cli::parse_from(["top-movers", "backfill", "--end-date", "2025-03-07"]);
        match cli.command {
            Commands::Backfill(args) => {
                assert_eq!(args.end_date.to_string(), "2025-03-07");
                assert_eq!(args.days, 7);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.config, "config/Config.toml");
    }

    #[test]
    fn test_parse_global_config_after_subcommand() {
        let cli = Cli::parse_from(["top-movers", "ingest", "--config", "/etc/movers.toml"]);
        assert!(matches!(cli.command, Commands::Ingest));
        assert_eq!(cli.config, "/etc/movers.toml");
    }

    #[test]
    fn test_backfill_rejects_bad_date() {
        let result = Cli::try_parse_from(["top-movers", "backfill", "--end-date", "03/07/2025"]);
        assert!(result.is_err());
    }
}

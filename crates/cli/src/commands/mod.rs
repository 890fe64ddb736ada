//! CLI commands for the daily top mover service.

pub mod ingest;
pub mod migrate;
pub mod serve;

pub use ingest::{run_backfill, run_ingest, BackfillArgs};
pub use migrate::run_migrate;
pub use serve::{run_serve, ServeArgs};

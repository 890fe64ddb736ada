//! Daily top mover ingestion.
//!
//! [`IngestionOrchestrator`] drives one run: it learns the trading date from
//! the anchor ticker, short-circuits if that day is already stored, fetches
//! the rest of the watchlist, picks the winner with [`WinnerSelector`], and
//! commits it through [`IdempotentWriter`].

pub mod error;
pub mod orchestrator;
pub mod report;
pub mod selector;
pub mod writer;

pub use error::{IngestionError, Result};
pub use orchestrator::{IngestionOrchestrator, BACKFILL_LOOKBACK_DAYS};
pub use report::{IngestionReport, MESSAGE_ALREADY_STORED, MESSAGE_RACE_LOST};
pub use selector::{SelectionError, WinnerSelector};
pub use writer::{CommitOutcome, IdempotentWriter};

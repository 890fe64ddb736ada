//! Outcome summary of one ingestion run.

use chrono::NaiveDate;
use serde::Serialize;
use top_movers_data::{PublicRecord, WinnerRecord};

pub const MESSAGE_ALREADY_STORED: &str = "already_stored";
pub const MESSAGE_RACE_LOST: &str = "race_lost";

/// JSON-serializable result of a run.
///
/// `item` is always the public projection; partition and key columns never
/// appear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionReport {
    pub stored: bool,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub trading_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<PublicRecord>,
    pub success_count: usize,
    pub failure_count: usize,
    pub failures: Vec<String>,
}

impl IngestionReport {
    /// This run wrote `record` after fetching `success_count` quotes.
    #[must_use]
    pub fn stored(record: &WinnerRecord, success_count: usize) -> Self {
        Self {
            stored: true,
            cached: false,
            message: None,
            trading_date: record.trade_date,
            item: Some(record.to_public()),
            success_count,
            failure_count: 0,
            failures: Vec::new(),
        }
    }

    /// The day was already stored before the full fetch began.
    #[must_use]
    pub fn already_stored(trading_date: NaiveDate, existing: &WinnerRecord) -> Self {
        Self::cached(trading_date, MESSAGE_ALREADY_STORED, Some(existing.to_public()))
    }

    /// A concurrent run committed first.
    #[must_use]
    pub fn race_lost(trading_date: NaiveDate, existing: Option<&WinnerRecord>) -> Self {
        Self::cached(
            trading_date,
            MESSAGE_RACE_LOST,
            existing.map(WinnerRecord::to_public),
        )
    }

    fn cached(trading_date: NaiveDate, message: &str, item: Option<PublicRecord>) -> Self {
        Self {
            stored: false,
            cached: true,
            message: Some(message.to_string()),
            trading_date,
            item,
            success_count: 0,
            failure_count: 0,
            failures: Vec::new(),
        }
    }

    /// True for both fresh and cached outcomes.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.stored || self.cached
    }
}

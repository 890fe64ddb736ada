use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;
use top_movers_core::QuoteError;
use top_movers_data::StoreError;
use top_movers_market_data::FetchError;

use crate::selector::SelectionError;

/// Reasons an ingestion run ends without a stored or cached outcome.
///
/// Every variant leaves the store unchanged, so any run may be retried.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error(transparent)]
    Fetch(FetchError),

    #[error("trading date mismatch for {ticker}: expected {expected}, got {actual}")]
    DateInconsistency {
        ticker: String,
        expected: NaiveDate,
        actual: NaiveDate,
    },

    #[error("winner selection failed: {0}")]
    Selection(#[from] SelectionError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("ingestion run exceeded {0:?}")]
    Timeout(Duration),

    #[error("found {found} trading dates up to {end_date}, need {requested}")]
    InsufficientTradingDates {
        requested: usize,
        found: usize,
        end_date: NaiveDate,
    },

    #[error("invalid watchlist: {0}")]
    Watchlist(#[from] QuoteError),
}

impl From<FetchError> for IngestionError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::DateMismatch {
                ticker,
                expected,
                actual,
            } => Self::DateInconsistency {
                ticker,
                expected,
                actual,
            },
            other => Self::Fetch(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_mismatch_maps_to_inconsistency() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        let err: IngestionError = FetchError::DateMismatch {
            ticker: "AAPL".to_string(),
            expected: date,
            actual: date.pred_opt().unwrap(),
        }
        .into();
        assert!(matches!(err, IngestionError::DateInconsistency { .. }));
    }

    #[test]
    fn test_other_fetch_errors_are_wrapped() {
        let err: IngestionError = FetchError::malformed("AAPL", "no results").into();
        assert!(matches!(err, IngestionError::Fetch(_)));
        assert!(err.to_string().contains("no results"));
    }
}

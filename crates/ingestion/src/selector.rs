use chrono::NaiveDate;
use thiserror::Error;
use top_movers_core::Quote;
use top_movers_data::WinnerRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no quotes to select from")]
    Empty,

    #[error("quote for {ticker} is dated {actual}, expected {expected}")]
    DateInconsistency {
        ticker: String,
        expected: NaiveDate,
        actual: NaiveDate,
    },
}

/// Picks the largest absolute mover from one day's quotes.
#[derive(Debug, Clone)]
pub struct WinnerSelector {
    partition: String,
}

impl WinnerSelector {
    #[must_use]
    pub fn new(partition: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
        }
    }

    #[must_use]
    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Returns the record for the quote with the largest `|percent change|`.
    ///
    /// Percent changes are compared after quantization to the stored scale,
    /// so the winner is decided on exactly the values that get persisted.
    /// On a tie the quote that comes first in `quotes` wins.
    ///
    /// # Errors
    /// Returns [`SelectionError::Empty`] for no quotes, or
    /// [`SelectionError::DateInconsistency`] if any quote's date differs
    /// from the first quote's.
    pub fn select(&self, quotes: &[Quote]) -> Result<WinnerRecord, SelectionError> {
        let (first, rest) = quotes.split_first().ok_or(SelectionError::Empty)?;
        let expected = first.trading_date();

        if let Some(stray) = rest.iter().find(|q| q.trading_date() != expected) {
            return Err(SelectionError::DateInconsistency {
                ticker: stray.ticker().to_string(),
                expected,
                actual: stray.trading_date(),
            });
        }

        let mut best = WinnerRecord::from_quote(&self.partition, first);
        for quote in rest {
            let candidate = WinnerRecord::from_quote(&self.partition, quote);
            if candidate.percent_change.abs() > best.percent_change.abs() {
                best = candidate;
            }
        }
        Ok(best)
    }
}

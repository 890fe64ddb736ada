//! At-most-once persistence of the daily winner.

use std::sync::Arc;

use chrono::NaiveDate;
use top_movers_data::{PutOutcome, StoreError, WinnerRecord, WinnerStore};
use tracing::debug;

/// Result of a commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// This call wrote the record.
    Stored,
    /// A record for the same day was already present; nothing was written.
    AlreadyStored,
}

/// Writes at most one winner per `(partition, trade_date)`.
#[derive(Clone)]
pub struct IdempotentWriter {
    store: Arc<dyn WinnerStore>,
    partition: String,
}

impl std::fmt::Debug for IdempotentWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdempotentWriter")
            .field("partition", &self.partition)
            .finish_non_exhaustive()
    }
}

impl IdempotentWriter {
    pub fn new(store: Arc<dyn WinnerStore>, partition: impl Into<String>) -> Self {
        Self {
            store,
            partition: partition.into(),
        }
    }

    #[must_use]
    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Returns true if a winner is stored for `date`.
    ///
    /// # Errors
    /// Returns an error if the store read fails.
    pub async fn probe_exists(&self, date: NaiveDate) -> Result<bool, StoreError> {
        Ok(self.existing(date).await?.is_some())
    }

    /// Returns the stored winner for `date`, if any.
    ///
    /// # Errors
    /// Returns an error if the store read fails.
    pub async fn existing(&self, date: NaiveDate) -> Result<Option<WinnerRecord>, StoreError> {
        self.store.get(&self.partition, date).await
    }

    /// Inserts `record` unless its day is already stored.
    ///
    /// # Errors
    /// Returns an error for store failures other than the record already
    /// existing.
    pub async fn commit(&self, record: &WinnerRecord) -> Result<CommitOutcome, StoreError> {
        match self.store.put_if_absent(record).await? {
            PutOutcome::Inserted => Ok(CommitOutcome::Stored),
            PutOutcome::ConditionFailed => {
                debug!(
                    "Winner for {} already stored, dropping {}",
                    record.trade_date, record.ticker
                );
                Ok(CommitOutcome::AlreadyStored)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use top_movers_data::InMemoryWinnerStore;

    fn record(ticker: &str) -> WinnerRecord {
        WinnerRecord {
            partition: "MOVERS".to_string(),
            trade_date: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
            ticker: ticker.to_string(),
            percent_change: dec!(4.15),
            closing_price: dec!(312.45),
        }
    }

    #[tokio::test]
    async fn test_commit_then_already_stored() {
        let store = Arc::new(InMemoryWinnerStore::new());
        let writer = IdempotentWriter::new(store.clone(), "MOVERS");
        let date = record("TSLA").trade_date;

        assert!(!writer.probe_exists(date).await.unwrap());
        assert_eq!(writer.commit(&record("TSLA")).await.unwrap(), CommitOutcome::Stored);
        assert_eq!(
            writer.commit(&record("AAPL")).await.unwrap(),
            CommitOutcome::AlreadyStored
        );

        assert!(writer.probe_exists(date).await.unwrap());
        assert_eq!(writer.existing(date).await.unwrap().unwrap().ticker, "TSLA");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = Arc::new(InMemoryWinnerStore::new());
        store.set_fail_writes(true);
        let writer = IdempotentWriter::new(store.clone(), "MOVERS");

        assert!(matches!(
            writer.commit(&record("TSLA")).await,
            Err(StoreError::Unavailable(_))
        ));
        store.set_fail_reads(true);
        assert!(writer.probe_exists(record("TSLA").trade_date).await.is_err());
    }

    #[tokio::test]
    async fn test_lookups_are_scoped_to_partition() {
        let store = Arc::new(InMemoryWinnerStore::with_records([record("TSLA")]));
        let writer = IdempotentWriter::new(store, "OTHER");
        assert!(!writer.probe_exists(record("TSLA").trade_date).await.unwrap());
    }
}

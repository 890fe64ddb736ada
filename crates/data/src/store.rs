//! Storage contract shared by ingestion and retrieval.
//!
//! Three primitives: get by key, insert-if-absent, and a newest-first range
//! query within a partition.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::models::WinnerRecord;

/// Result of a conditional insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// No record existed for the key; this call created it.
    Inserted,
    /// A record already existed for the key; nothing was written.
    ConditionFailed,
}

/// Store failures other than a failed insert condition.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[async_trait]
pub trait WinnerStore: Send + Sync {
    /// Reads the record for `(partition, date)`, if any.
    async fn get(&self, partition: &str, date: NaiveDate) -> Result<Option<WinnerRecord>>;

    /// Inserts `record` only if its key is absent.
    ///
    /// The existence check and the insert are atomic with respect to other
    /// callers.
    async fn put_if_absent(&self, record: &WinnerRecord) -> Result<PutOutcome>;

    /// Returns up to `limit` records in `partition`, newest date first.
    async fn query_recent(&self, partition: &str, limit: u32) -> Result<Vec<WinnerRecord>>;
}

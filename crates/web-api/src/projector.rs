use std::sync::Arc;

use thiserror::Error;
use top_movers_core::{IngestionConfig, RetrievalConfig};
use top_movers_data::{PublicRecord, WinnerStore};

/// Opaque retrieval failure. The cause is logged, never returned.
#[derive(Debug, Error)]
#[error("failed to load movers")]
pub struct ProjectionError;

/// Read-only view over the stored winners.
pub struct RetrievalProjector {
    store: Arc<dyn WinnerStore>,
    partition: String,
    default_limit: u32,
}

impl RetrievalProjector {
    pub fn new(store: Arc<dyn WinnerStore>, partition: impl Into<String>, default_limit: u32) -> Self {
        Self {
            store,
            partition: partition.into(),
            default_limit,
        }
    }

    pub fn from_config(
        store: Arc<dyn WinnerStore>,
        ingestion: &IngestionConfig,
        retrieval: &RetrievalConfig,
    ) -> Self {
        Self::new(store, ingestion.partition.clone(), retrieval.limit)
    }

    #[must_use]
    pub fn default_limit(&self) -> u32 {
        self.default_limit
    }

    /// Up to `limit` winners, newest trading date first, in public shape.
    ///
    /// # Errors
    /// Returns [`ProjectionError`] if the store query fails.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<PublicRecord>, ProjectionError> {
        match self.store.query_recent(&self.partition, limit).await {
            Ok(records) => Ok(records.into_iter().map(PublicRecord::from).collect()),
            Err(e) => {
                tracing::error!(
                    partition = %self.partition,
                    limit,
                    error = %e,
                    "Failed to query recent movers"
                );
                Err(ProjectionError)
            }
        }
    }

    /// [`list_recent`](Self::list_recent) with the configured default limit.
    ///
    /// # Errors
    /// Returns [`ProjectionError`] if the store query fails.
    pub async fn latest(&self) -> Result<Vec<PublicRecord>, ProjectionError> {
        self.list_recent(self.default_limit).await
    }
}

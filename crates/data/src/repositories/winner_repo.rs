//! Winner record repository.
//!
//! PostgreSQL implementation of [`WinnerStore`]. The conditional insert
//! relies on the `(partition, trade_date)` primary key.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::WinnerRecord;
use crate::store::{PutOutcome, Result, WinnerStore};

/// Repository for daily winner records.
#[derive(Debug, Clone)]
pub struct WinnerRepository {
    pool: PgPool,
}

impl WinnerRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WinnerStore for WinnerRepository {
    async fn get(&self, partition: &str, date: NaiveDate) -> Result<Option<WinnerRecord>> {
        let record = sqlx::query_as::<_, WinnerRecord>(
            r#"
            SELECT partition, trade_date, ticker, percent_change, closing_price
            FROM daily_movers
            WHERE partition = $1 AND trade_date = $2
            "#,
        )
        .bind(partition)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn put_if_absent(&self, record: &WinnerRecord) -> Result<PutOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO daily_movers
                (partition, trade_date, ticker, percent_change, closing_price)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (partition, trade_date) DO NOTHING
            "#,
        )
        .bind(&record.partition)
        .bind(record.trade_date)
        .bind(&record.ticker)
        .bind(record.percent_change)
        .bind(record.closing_price)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(
                partition = %record.partition,
                trade_date = %record.trade_date,
                "conditional insert skipped, record already present"
            );
            Ok(PutOutcome::ConditionFailed)
        } else {
            Ok(PutOutcome::Inserted)
        }
    }

    async fn query_recent(&self, partition: &str, limit: u32) -> Result<Vec<WinnerRecord>> {
        let records = sqlx::query_as::<_, WinnerRecord>(
            r#"
            SELECT partition, trade_date, ticker, percent_change, closing_price
            FROM daily_movers
            WHERE partition = $1
            ORDER BY trade_date DESC
            LIMIT $2
            "#,
        )
        .bind(partition)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

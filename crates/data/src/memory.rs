//! In-process [`WinnerStore`].
//!
//! Holds records in a `BTreeMap` behind a mutex, which makes the
//! check-and-insert in `put_if_absent` atomic. Failures can be injected to
//! exercise error paths.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::models::WinnerRecord;
use crate::store::{PutOutcome, Result, StoreError, WinnerStore};

type Key = (String, NaiveDate);

#[derive(Debug, Default)]
pub struct InMemoryWinnerStore {
    records: Mutex<BTreeMap<Key, WinnerRecord>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    put_calls: AtomicUsize,
}

impl InMemoryWinnerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records`.
    ///
    /// Later records with a duplicate key are ignored.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = WinnerRecord>) -> Self {
        let store = Self::new();
        {
            let mut map = store.records.lock();
            for record in records {
                map.entry((record.partition.clone(), record.trade_date))
                    .or_insert(record);
            }
        }
        store
    }

    /// Makes every `get` and `query_recent` fail with [`StoreError::Unavailable`].
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every `put_if_absent` fail with [`StoreError::Unavailable`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `put_if_absent` calls, including failed ones.
    #[must_use]
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Snapshot of all records, ordered by partition then date.
    #[must_use]
    pub fn records(&self) -> Vec<WinnerRecord> {
        self.records.lock().values().cloned().collect()
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected read failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl WinnerStore for InMemoryWinnerStore {
    async fn get(&self, partition: &str, date: NaiveDate) -> Result<Option<WinnerRecord>> {
        self.check_reads()?;
        Ok(self
            .records
            .lock()
            .get(&(partition.to_string(), date))
            .cloned())
    }

    async fn put_if_absent(&self, record: &WinnerRecord) -> Result<PutOutcome> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }

        let mut records = self.records.lock();
        let key = (record.partition.clone(), record.trade_date);
        if records.contains_key(&key) {
            return Ok(PutOutcome::ConditionFailed);
        }
        records.insert(key, record.clone());
        Ok(PutOutcome::Inserted)
    }

    async fn query_recent(&self, partition: &str, limit: u32) -> Result<Vec<WinnerRecord>> {
        self.check_reads()?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self
            .records
            .lock()
            .values()
            .filter(|r| r.partition == partition)
            .rev()
            .take(limit)
            .cloned()
            .collect())
    }
}

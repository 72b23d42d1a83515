use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use chrono::{Duration, Utc};

use super::table::PostingTable;
use crate::workflows::pipeline::{JobStore, StoreError, StoredPosting};
use crate::workflows::postings::JobRecord;

/// Process-local store, handy for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    table: Mutex<PostingTable>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|table| table.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, PostingTable>, StoreError> {
        self.table
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl JobStore for MemoryJobStore {
    fn upsert(&self, record: &JobRecord, company: &str) -> Result<(), StoreError> {
        self.lock()?.upsert(record, company, Utc::now())?;
        Ok(())
    }

    fn existing_ids(&self, company: &str) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.lock()?.existing_ids(company))
    }

    fn set_match_flags(&self, company: &str, matched_ids: &[String]) -> Result<(), StoreError> {
        self.lock()?.set_match_flags(company, matched_ids);
        Ok(())
    }

    fn postings(
        &self,
        company: Option<&str>,
        scraped_within: Option<Duration>,
    ) -> Result<Vec<StoredPosting>, StoreError> {
        Ok(self.lock()?.postings(company, scraped_within, Utc::now()))
    }
}

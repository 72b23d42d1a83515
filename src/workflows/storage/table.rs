use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};

use crate::workflows::pipeline::{StoreError, StoredPosting};
use crate::workflows::postings::{JobKey, JobRecord};

/// Keyed posting table shared by the store implementations.
#[derive(Debug, Default, Clone)]
pub(crate) struct PostingTable {
    rows: BTreeMap<JobKey, StoredPosting>,
}

impl PostingTable {
    pub(crate) fn from_rows(rows: Vec<StoredPosting>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|row| row.key().map(|key| (key, row)))
            .collect();
        Self { rows }
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = &StoredPosting> {
        self.rows.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn upsert(
        &mut self,
        record: &JobRecord,
        company: &str,
        now: DateTime<Utc>,
    ) -> Result<JobKey, StoreError> {
        let mut record = record.clone();
        record.company = company.to_string();
        let key = record.key().ok_or(StoreError::MissingKey)?;

        self.rows.insert(
            key.clone(),
            StoredPosting {
                record,
                scraped_at: now,
                entry_level: false,
            },
        );
        Ok(key)
    }

    pub(crate) fn existing_ids(&self, company: &str) -> BTreeSet<String> {
        self.rows
            .keys()
            .filter(|key| key.company == company)
            .map(|key| key.id.clone())
            .collect()
    }

    /// Returns how many of `matched_ids` were present.
    pub(crate) fn set_match_flags(&mut self, company: &str, matched_ids: &[String]) -> usize {
        let mut flagged = 0;
        for id in matched_ids {
            let key = JobKey::new(id.as_str(), company);
            if let Some(row) = self.rows.get_mut(&key) {
                row.entry_level = true;
                flagged += 1;
            }
        }
        flagged
    }

    pub(crate) fn postings(
        &self,
        company: Option<&str>,
        scraped_within: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Vec<StoredPosting> {
        let cutoff = scraped_within.map(|window| now - window);
        self.rows
            .values()
            .filter(|row| company.map_or(true, |company| row.record.company == company))
            .filter(|row| cutoff.map_or(true, |cutoff| row.scraped_at >= cutoff))
            .cloned()
            .collect()
    }
}

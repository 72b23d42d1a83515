use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::postings::{JobKey, JobRecord};

/// One page of a site's listing, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub items: Vec<JobRecord>,
    /// Total number of postings the site reports for the query, when it says.
    pub total_count: Option<usize>,
}

/// Site adapter producing partial records from listing pages.
pub trait ListingSource: Send + Sync {
    fn company(&self) -> &str;
    /// `page_index` starts at 1.
    fn fetch_page(&self, page_index: usize) -> Result<ListingPage, SourceError>;
}

/// Site adapter producing the detail payload for a listing. `Ok(None)` means the
/// posting is gone.
pub trait DetailFetcher: Send + Sync {
    fn fetch_detail(&self, partial: &JobRecord) -> Result<Option<JobRecord>, DetailError>;
}

/// Keyed persistent store for postings. Writes for an existing `(id, company)`
/// replace the prior snapshot.
pub trait JobStore: Send + Sync {
    fn upsert(&self, record: &JobRecord, company: &str) -> Result<(), StoreError>;
    fn existing_ids(&self, company: &str) -> Result<BTreeSet<String>, StoreError>;
    fn set_match_flags(&self, company: &str, matched_ids: &[String]) -> Result<(), StoreError>;
    /// Stored postings, optionally filtered by company and by scrape age.
    fn postings(
        &self,
        company: Option<&str>,
        scraped_within: Option<Duration>,
    ) -> Result<Vec<StoredPosting>, StoreError>;
}

/// Optional secondary filter comparing a posting against the candidate's resume.
pub trait ResumeMatcher: Send + Sync {
    fn match_against_resume(
        &self,
        record: &JobRecord,
        resume_text: &str,
    ) -> Result<ResumeMatch, EnrichmentError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeMatch {
    pub is_match: bool,
    pub reason: String,
}

/// Snapshot held by a [`JobStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPosting {
    pub record: JobRecord,
    pub scraped_at: DateTime<Utc>,
    #[serde(default)]
    pub entry_level: bool,
}

impl StoredPosting {
    pub fn key(&self) -> Option<JobKey> {
        self.record.key()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("listing page {page} request failed: {reason}")]
    Request { page: usize, reason: String },
    #[error("listing page {page} could not be parsed: {reason}")]
    Parse { page: usize, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum DetailError {
    #[error("detail request failed: {0}")]
    Request(String),
    #[error("detail payload could not be parsed: {0}")]
    Parse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("posting has neither an id nor a url and cannot be keyed")]
    MissingKey,
    #[error("job store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    #[error("resume matcher unavailable: {0}")]
    Unavailable(String),
}

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use chrono::Duration;

use crate::workflows::pipeline::{
    DetailError, DetailFetcher, EnrichmentError, JobStore, ListingPage, ListingSource,
    PipelineOrchestrator, PipelineSettings, ResumeMatch, ResumeMatcher, SourceError, StoreError,
    StoredPosting,
};
use crate::workflows::postings::JobRecord;
use crate::workflows::storage::MemoryJobStore;

pub(super) const COMPANY: &str = "apple";

pub(super) fn listing(index: usize, title: &str) -> JobRecord {
    JobRecord::listing(COMPANY, title, format!("job-{index}"))
        .with_posting_url(format!("https://jobs.example.com/{COMPANY}/job-{index}"))
}

pub(super) fn software_listings(count: usize) -> Vec<JobRecord> {
    (1..=count)
        .map(|index| listing(index, "Software Engineer"))
        .collect()
}

pub(super) fn ids(records: &[JobRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.listing_key().map(str::to_string))
        .collect()
}

/// Listing from an adapter that only scrapes links.
pub(super) fn url_only_listing(index: usize, title: &str) -> JobRecord {
    JobRecord {
        company: COMPANY.to_string(),
        title: title.to_string(),
        posting_url: Some(format!("https://jobs.example.com/{COMPANY}/details/{index}")),
        ..JobRecord::default()
    }
}

/// Listing source serving pre-built pages; pages listed in `failing` error out.
pub(super) struct FakeSource {
    pages: Vec<Vec<JobRecord>>,
    total: Option<usize>,
    failing: BTreeSet<usize>,
    requested: Mutex<Vec<usize>>,
}

impl FakeSource {
    pub(super) fn paged(records: Vec<JobRecord>, page_size: usize) -> Self {
        let total = records.len();
        let pages = records
            .chunks(page_size.max(1))
            .map(<[JobRecord]>::to_vec)
            .collect();
        Self {
            pages,
            total: Some(total),
            failing: BTreeSet::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn without_total(mut self) -> Self {
        self.total = None;
        self
    }

    pub(super) fn failing_on(mut self, page: usize) -> Self {
        self.failing.insert(page);
        self
    }

    pub(super) fn requested_pages(&self) -> Vec<usize> {
        self.requested
            .lock()
            .expect("source mutex poisoned")
            .clone()
    }
}

impl ListingSource for FakeSource {
    fn company(&self) -> &str {
        COMPANY
    }

    fn fetch_page(&self, page_index: usize) -> Result<ListingPage, SourceError> {
        self.requested
            .lock()
            .expect("source mutex poisoned")
            .push(page_index);

        if self.failing.contains(&page_index) {
            return Err(SourceError::Request {
                page: page_index,
                reason: "connection reset".to_string(),
            });
        }

        Ok(ListingPage {
            items: self
                .pages
                .get(page_index.saturating_sub(1))
                .cloned()
                .unwrap_or_default(),
            total_count: self.total,
        })
    }
}

/// Detail fetcher keyed by listing key. Unknown keys come back as not found.
#[derive(Default)]
pub(super) struct FakeDetails {
    details: BTreeMap<String, JobRecord>,
    failing: BTreeSet<String>,
    requested: Mutex<Vec<String>>,
}

impl FakeDetails {
    /// Every listing gets an empty detail payload, so the listing title is kept.
    pub(super) fn echoing(records: &[JobRecord]) -> Self {
        let details = ids(records)
            .into_iter()
            .map(|id| (id, JobRecord::default()))
            .collect();
        Self {
            details,
            ..Self::default()
        }
    }

    pub(super) fn with_detail(mut self, id: &str, detail: JobRecord) -> Self {
        self.details.insert(id.to_string(), detail);
        self
    }

    pub(super) fn with_requirements(self, id: &str, lines: &[&str]) -> Self {
        let detail = JobRecord {
            requirements: Some(lines.iter().map(|line| line.to_string()).collect()),
            ..JobRecord::default()
        };
        self.with_detail(id, detail)
    }

    pub(super) fn missing(mut self, id: &str) -> Self {
        self.details.remove(id);
        self
    }

    pub(super) fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub(super) fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .expect("details mutex poisoned")
            .clone()
    }
}

impl DetailFetcher for FakeDetails {
    fn fetch_detail(&self, partial: &JobRecord) -> Result<Option<JobRecord>, DetailError> {
        let id = partial.listing_key().unwrap_or_default().to_string();
        self.requested
            .lock()
            .expect("details mutex poisoned")
            .push(id.clone());

        if self.failing.contains(&id) {
            return Err(DetailError::Request("HTTP 503".to_string()));
        }
        Ok(self.details.get(&id).cloned())
    }
}

/// Resume matcher answering from a fixed table; ids not listed are errors.
#[derive(Default)]
pub(super) struct TableMatcher {
    answers: BTreeMap<String, bool>,
}

impl TableMatcher {
    pub(super) fn answer(mut self, id: &str, is_match: bool) -> Self {
        self.answers.insert(id.to_string(), is_match);
        self
    }
}

impl ResumeMatcher for TableMatcher {
    fn match_against_resume(
        &self,
        record: &JobRecord,
        resume_text: &str,
    ) -> Result<ResumeMatch, EnrichmentError> {
        let id = record.listing_key().unwrap_or_default().to_string();
        match self.answers.get(&id) {
            Some(true) => Ok(ResumeMatch {
                is_match: true,
                reason: format!("{resume_text} fits {}", record.title),
            }),
            Some(false) => Ok(ResumeMatch {
                is_match: false,
                reason: "stack mismatch".to_string(),
            }),
            None => Err(EnrichmentError::Unavailable("rate limited".to_string())),
        }
    }
}

/// Store that refuses writes while still answering reads.
#[derive(Default)]
pub(super) struct ReadOnlyStore {
    inner: MemoryJobStore,
}

impl JobStore for ReadOnlyStore {
    fn upsert(&self, _record: &JobRecord, _company: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }

    fn existing_ids(&self, company: &str) -> Result<BTreeSet<String>, StoreError> {
        self.inner.existing_ids(company)
    }

    fn set_match_flags(&self, _company: &str, _matched_ids: &[String]) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }

    fn postings(
        &self,
        company: Option<&str>,
        scraped_within: Option<Duration>,
    ) -> Result<Vec<StoredPosting>, StoreError> {
        self.inner.postings(company, scraped_within)
    }
}

pub(super) fn orchestrator<J: JobStore + 'static>(
    source: &Arc<FakeSource>,
    details: &Arc<FakeDetails>,
    store: &Arc<J>,
    settings: PipelineSettings,
) -> PipelineOrchestrator<FakeSource, FakeDetails, J> {
    PipelineOrchestrator::new(source.clone(), details.clone(), store.clone(), settings)
}

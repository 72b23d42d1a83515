use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use super::progress::{ProgressEvent, ProgressSink, TracingProgress, DEFAULT_PROGRESS_INTERVAL};
use super::repository::{
    DetailFetcher, JobStore, ListingPage, ListingSource, ResumeMatcher, SourceError,
};
use super::summary::{RunIssue, RunSummary};
use crate::workflows::discovery::{DiscoveryCursor, DiscoveryTracker, DEFAULT_CURSOR_DEPTH};
use crate::workflows::postings::{JobKey, JobRecord};
use crate::workflows::screening::{
    ClassificationVerdict, ClassifyError, EntryLevelClassifier, Strictness,
};

/// Knobs for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub strictness: Strictness,
    /// Re-detail postings the store already holds.
    pub force_refresh: bool,
    pub progress_interval: usize,
    /// How many of the newest discovered ids the next cursor remembers.
    pub cursor_depth: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            strictness: Strictness::Strict,
            force_refresh: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            cursor_depth: DEFAULT_CURSOR_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Walk every listing page.
    Full,
    /// Stop paginating at the first id remembered by the cursor.
    IncrementalNew(DiscoveryCursor),
}

impl RunMode {
    pub const fn label(&self) -> &'static str {
        match self {
            RunMode::Full => "full",
            RunMode::IncrementalNew(_) => "incremental_new",
        }
    }
}

/// Error that aborts a run. Everything else becomes a [`RunIssue`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("listing source for {company} is unavailable")]
    SourceUnavailable {
        company: String,
        #[source]
        source: SourceError,
    },
}

struct ResumeFilter {
    matcher: Arc<dyn ResumeMatcher>,
    resume_text: String,
}

struct Processed {
    key: Option<JobKey>,
    verdict: Option<ClassificationVerdict>,
    matched: bool,
}

/// Drives one company's run: listing pages, discovery, detail, screening, storage.
pub struct PipelineOrchestrator<S, D, J> {
    source: Arc<S>,
    details: Arc<D>,
    store: Arc<J>,
    classifier: EntryLevelClassifier,
    settings: PipelineSettings,
    resume: Option<ResumeFilter>,
}

impl<S, D, J> PipelineOrchestrator<S, D, J>
where
    S: ListingSource + 'static,
    D: DetailFetcher + 'static,
    J: JobStore + 'static,
{
    pub fn new(source: Arc<S>, details: Arc<D>, store: Arc<J>, settings: PipelineSettings) -> Self {
        Self {
            source,
            details,
            store,
            classifier: EntryLevelClassifier::new(),
            settings,
            resume: None,
        }
    }

    /// Adds a second screening pass for postings the classifier accepts.
    pub fn with_resume_matcher(
        mut self,
        matcher: Arc<dyn ResumeMatcher>,
        resume_text: impl Into<String>,
    ) -> Self {
        self.resume = Some(ResumeFilter {
            matcher,
            resume_text: resume_text.into(),
        });
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn run(&self, mode: RunMode) -> Result<RunSummary, PipelineError> {
        self.run_with_progress(mode, &mut TracingProgress)
    }

    pub fn run_with_progress(
        &self,
        mode: RunMode,
        progress: &mut dyn ProgressSink,
    ) -> Result<RunSummary, PipelineError> {
        let started = Instant::now();
        let company = self.source.company().to_string();
        info!(company = %company, mode = mode.label(), strictness = self.settings.strictness.label(), "run started");

        let (cursor, mut tracker) = match mode {
            RunMode::Full => (DiscoveryCursor::default(), None),
            RunMode::IncrementalNew(cursor) => {
                let tracker = DiscoveryTracker::new(cursor.clone());
                (cursor, Some(tracker))
            }
        };

        let mut issues = Vec::new();
        let listings = self.collect_listings(&company, tracker.as_mut(), &mut issues)?;
        let discovered: Vec<String> = listings
            .iter()
            .filter_map(|listing| listing.listing_key().map(str::to_string))
            .collect();
        let next_cursor = cursor.advance(&discovered, self.settings.cursor_depth);

        let existing = self.existing_ids(&company, &mut issues);
        let mut seen = HashSet::new();
        let mut skipped_count = 0;
        let mut candidates = Vec::with_capacity(listings.len());
        for listing in listings {
            if let Some(listing_key) = listing.listing_key().map(str::to_string) {
                if existing.contains(&listing_key) || !seen.insert(listing_key) {
                    skipped_count += 1;
                    continue;
                }
            }
            candidates.push(listing);
        }
        debug!(company = %company, candidates = candidates.len(), skipped = skipped_count, "candidates selected");

        let total = candidates.len();
        let interval = self.settings.progress_interval.max(1);
        let mut processed_count = 0;
        let mut matched_count = 0;
        let mut matched = Vec::new();
        let mut verdicts = BTreeMap::new();

        for (index, partial) in candidates.into_iter().enumerate() {
            match self.process(&company, partial, &mut issues) {
                Some(outcome) => {
                    processed_count += 1;
                    if outcome.matched {
                        matched_count += 1;
                    }
                    if let Some(key) = outcome.key {
                        if outcome.matched {
                            matched.push(key.clone());
                        }
                        if let Some(verdict) = outcome.verdict {
                            verdicts.insert(key, verdict);
                        }
                    }
                }
                None => skipped_count += 1,
            }

            let count = index + 1;
            if count % interval == 0 {
                progress.on_progress(&ProgressEvent {
                    company: company.clone(),
                    count,
                    total,
                    matched: matched_count,
                    elapsed: started.elapsed(),
                });
            }
        }

        let matched_ids: Vec<String> = matched.iter().map(|key| key.id.clone()).collect();
        if let Err(err) = self.store.set_match_flags(&company, &matched_ids) {
            warn!(company = %company, error = %err, "failed to flag matched postings");
            issues.push(RunIssue::StoreUnavailable {
                operation: "set_match_flags",
                reason: err.to_string(),
            });
        }

        let summary = RunSummary {
            company,
            processed_count,
            matched_count,
            skipped_count,
            elapsed: started.elapsed(),
            matched,
            verdicts,
            issues,
            next_cursor,
        };
        info!(
            company = %summary.company,
            processed = summary.processed_count,
            matched = summary.matched_count,
            skipped = summary.skipped_count,
            issues = summary.issues.len(),
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "run finished"
        );
        Ok(summary)
    }

    fn collect_listings(
        &self,
        company: &str,
        mut tracker: Option<&mut DiscoveryTracker>,
        issues: &mut Vec<RunIssue>,
    ) -> Result<Vec<JobRecord>, PipelineError> {
        let first = self
            .source
            .fetch_page(1)
            .map_err(|source| PipelineError::SourceUnavailable {
                company: company.to_string(),
                source,
            })?;
        let page_count = page_count(&first);
        info!(company, page_count, total = ?first.total_count, "listing pagination resolved");

        let mut listings = Vec::new();
        if take_new(first.items, tracker.as_deref_mut(), &mut listings) {
            return Ok(listings);
        }

        for page in 2..=page_count {
            match self.source.fetch_page(page) {
                Ok(next) => {
                    if take_new(next.items, tracker.as_deref_mut(), &mut listings) {
                        debug!(company, page, "reached previously discovered postings");
                        break;
                    }
                }
                Err(err) => {
                    warn!(company, page, error = %err, "listing page omitted");
                    issues.push(RunIssue::PartialPageFailure {
                        page,
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(listings)
    }

    fn existing_ids(&self, company: &str, issues: &mut Vec<RunIssue>) -> BTreeSet<String> {
        if self.settings.force_refresh {
            return BTreeSet::new();
        }

        self.store.existing_ids(company).unwrap_or_else(|err| {
            warn!(company, error = %err, "could not read stored ids; detailing everything");
            issues.push(RunIssue::StoreUnavailable {
                operation: "existing_ids",
                reason: err.to_string(),
            });
            BTreeSet::new()
        })
    }

    /// Returns `None` when the posting was skipped before classification.
    fn process(
        &self,
        company: &str,
        partial: JobRecord,
        issues: &mut Vec<RunIssue>,
    ) -> Option<Processed> {
        let listing = partial.printable();
        let detail = match self.details.fetch_detail(&partial) {
            Ok(Some(detail)) => detail,
            Ok(None) => {
                warn!(company, listing = %listing, "posting no longer available");
                issues.push(RunIssue::DetailUnavailable {
                    listing,
                    reason: "posting not found".to_string(),
                });
                return None;
            }
            Err(err) => {
                warn!(company, listing = %listing, error = %err, "detail fetch failed");
                issues.push(RunIssue::DetailUnavailable {
                    listing,
                    reason: err.to_string(),
                });
                return None;
            }
        };

        let mut record = partial.merged_with(detail);
        record.company = company.to_string();
        let key = record.key();

        let (verdict, matched) = match self.classifier.classify(&record, self.settings.strictness) {
            Ok(verdict) => {
                let (verdict, matched) = self.screen(&record, verdict, &listing, issues);
                (Some(verdict), matched)
            }
            Err(ClassifyError::InvalidInput { field }) => {
                warn!(company, listing = %listing, field, "posting cannot be classified");
                issues.push(RunIssue::InvalidInput {
                    listing: listing.clone(),
                    field,
                });
                (None, false)
            }
        };

        if let Err(err) = self.store.upsert(&record, company) {
            warn!(company, listing = %listing, error = %err, "failed to store posting");
            issues.push(RunIssue::StoreUnavailable {
                operation: "upsert",
                reason: err.to_string(),
            });
        }

        Some(Processed {
            key,
            verdict,
            matched,
        })
    }

    fn screen(
        &self,
        record: &JobRecord,
        mut verdict: ClassificationVerdict,
        listing: &str,
        issues: &mut Vec<RunIssue>,
    ) -> (ClassificationVerdict, bool) {
        if !verdict.is_entry_level {
            debug!(listing, reason = %verdict.summary(), "posting screened out");
            return (verdict, false);
        }

        let Some(resume) = &self.resume else {
            return (verdict, true);
        };

        match resume
            .matcher
            .match_against_resume(record, &resume.resume_text)
        {
            Ok(answer) => {
                if !answer.is_match {
                    debug!(listing, reason = %answer.reason, "resume matcher declined posting");
                }
                let is_match = answer.is_match;
                verdict.matched_reason = Some(answer.reason);
                (verdict, is_match)
            }
            Err(err) => {
                warn!(listing, error = %err, "resume matcher failed; keeping classifier verdict");
                issues.push(RunIssue::EnrichmentUnavailable {
                    listing: listing.to_string(),
                    reason: err.to_string(),
                });
                (verdict, true)
            }
        }
    }
}

/// Page 1 sets the page size; an unknown total means page 1 is all there is.
fn page_count(first: &ListingPage) -> usize {
    let page_size = first.items.len();
    match first.total_count {
        Some(total) if page_size > 0 => total.div_ceil(page_size).max(1),
        _ => 1,
    }
}

/// Appends the new leading entries of a page; `true` once the boundary shows up.
fn take_new(
    mut items: Vec<JobRecord>,
    tracker: Option<&mut DiscoveryTracker>,
    listings: &mut Vec<JobRecord>,
) -> bool {
    let Some(tracker) = tracker else {
        listings.extend(items);
        return false;
    };

    let scan = tracker.scan_page(items.iter().map(|item| item.listing_key()));
    items.truncate(scan.new_count);
    listings.extend(items);
    scan.boundary_reached
}

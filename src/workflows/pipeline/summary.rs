use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::workflows::discovery::DiscoveryCursor;
use crate::workflows::postings::JobKey;
use crate::workflows::screening::ClassificationVerdict;

/// Non-fatal condition recorded during a run. The affected listing or page is
/// skipped and the run keeps going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunIssue {
    PartialPageFailure { page: usize, reason: String },
    DetailUnavailable { listing: String, reason: String },
    InvalidInput { listing: String, field: &'static str },
    EnrichmentUnavailable { listing: String, reason: String },
    StoreUnavailable { operation: &'static str, reason: String },
}

impl RunIssue {
    pub const fn label(&self) -> &'static str {
        match self {
            RunIssue::PartialPageFailure { .. } => "partial_page_failure",
            RunIssue::DetailUnavailable { .. } => "detail_unavailable",
            RunIssue::InvalidInput { .. } => "invalid_input",
            RunIssue::EnrichmentUnavailable { .. } => "enrichment_unavailable",
            RunIssue::StoreUnavailable { .. } => "store_unavailable",
        }
    }
}

impl fmt::Display for RunIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunIssue::PartialPageFailure { page, reason } => {
                write!(f, "page {page} omitted: {reason}")
            }
            RunIssue::DetailUnavailable { listing, reason } => {
                write!(f, "{listing} skipped: {reason}")
            }
            RunIssue::InvalidInput { listing, field } => {
                write!(f, "{listing} not classified: missing {field}")
            }
            RunIssue::EnrichmentUnavailable { listing, reason } => {
                write!(f, "{listing} kept without resume match: {reason}")
            }
            RunIssue::StoreUnavailable { operation, reason } => {
                write!(f, "store {operation} failed: {reason}")
            }
        }
    }
}

/// Best-effort account of one run; produced whenever the first listing page loads.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub company: String,
    /// Candidates that were detailed, classified and handed to the store.
    pub processed_count: usize,
    pub matched_count: usize,
    /// Candidates dropped before classification: already stored, repeated within
    /// the listing, or missing their detail payload.
    pub skipped_count: usize,
    pub elapsed: Duration,
    /// Matched keys in discovery order. Matches without any identifier count
    /// towards `matched_count` but cannot be listed here.
    pub matched: Vec<JobKey>,
    pub verdicts: BTreeMap<JobKey, ClassificationVerdict>,
    pub issues: Vec<RunIssue>,
    /// Cursor to persist for the next incremental run.
    pub next_cursor: DiscoveryCursor,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issue_count(&self, label: &str) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.label() == label)
            .count()
    }
}

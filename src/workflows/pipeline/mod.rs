//! Run orchestration: pagination, incremental discovery, detail enrichment,
//! classification and persistence against site adapter traits.

pub mod progress;
pub mod repository;
pub mod service;
pub mod summary;

#[cfg(test)]
mod tests;

pub use progress::{ProgressEvent, ProgressSink, TracingProgress, DEFAULT_PROGRESS_INTERVAL};
pub use repository::{
    DetailError, DetailFetcher, EnrichmentError, JobStore, ListingPage, ListingSource,
    ResumeMatch, ResumeMatcher, SourceError, StoreError, StoredPosting,
};
pub use service::{PipelineError, PipelineOrchestrator, PipelineSettings, RunMode};
pub use summary::{RunIssue, RunSummary};

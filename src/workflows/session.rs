//! Host-side wiring for one scouting pass over a site: cursor in, run, cursor and
//! match report out.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::AppError;
use crate::telemetry;
use crate::workflows::discovery::CursorStore;
use crate::workflows::pipeline::{
    DetailFetcher, ListingSource, PipelineOrchestrator, ProgressSink, ResumeMatcher, RunMode,
    RunSummary, TracingProgress,
};
use crate::workflows::report::export_match_report;
use crate::workflows::storage::JsonFileJobStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryMode {
    /// Walk the whole listing.
    Full,
    /// Resume from the company's saved cursor.
    OnlyNew,
}

#[derive(Debug)]
pub struct SessionReport {
    pub summary: RunSummary,
    pub report_path: PathBuf,
    pub report_rows: usize,
}

pub struct ScoutSession {
    config: AppConfig,
    store: Arc<JsonFileJobStore>,
    cursors: CursorStore,
    resume: Option<(Arc<dyn ResumeMatcher>, String)>,
}

impl ScoutSession {
    pub fn open(config: AppConfig) -> Result<Self, AppError> {
        let store = Arc::new(JsonFileJobStore::open(config.storage.jobs_file())?);
        let cursors = CursorStore::new(config.storage.cursor_dir());
        Ok(Self {
            config,
            store,
            cursors,
            resume: None,
        })
    }

    /// Loads `.env` and the process environment, installs logging, then opens
    /// the session.
    pub fn from_env() -> Result<Self, AppError> {
        let config = AppConfig::load()?;
        if !telemetry::init(&config.telemetry)? {
            info!("keeping the host's tracing subscriber");
        }
        info!(
            environment = config.environment.label(),
            data_dir = %config.storage.data_dir.display(),
            strict = config.pipeline.strict,
            "scout session configured"
        );
        Self::open(config)
    }

    pub fn store(&self) -> &Arc<JsonFileJobStore> {
        &self.store
    }

    /// Enables resume matching with the resume at `SCOUT_RESUME_PATH`. Without a
    /// configured resume the session keeps classifier-only screening.
    pub fn with_resume_matcher(mut self, matcher: Arc<dyn ResumeMatcher>) -> Result<Self, AppError> {
        let Some(path) = self.config.storage.resume_path.as_ref() else {
            warn!("resume matcher supplied but no resume path configured; skipping");
            return Ok(self);
        };

        let resume_text = fs::read_to_string(path)?;
        info!(path = %path.display(), chars = resume_text.len(), "resume loaded");
        self.resume = Some((matcher, resume_text));
        Ok(self)
    }

    pub fn scan<S, D>(
        &self,
        source: Arc<S>,
        details: Arc<D>,
        mode: DiscoveryMode,
        today: NaiveDate,
    ) -> Result<SessionReport, AppError>
    where
        S: ListingSource + 'static,
        D: DetailFetcher + 'static,
    {
        self.scan_with_progress(source, details, mode, today, &mut TracingProgress)
    }

    pub fn scan_with_progress<S, D>(
        &self,
        source: Arc<S>,
        details: Arc<D>,
        mode: DiscoveryMode,
        today: NaiveDate,
        progress: &mut dyn ProgressSink,
    ) -> Result<SessionReport, AppError>
    where
        S: ListingSource + 'static,
        D: DetailFetcher + 'static,
    {
        let company = source.company().to_string();
        let run_mode = match mode {
            DiscoveryMode::Full => RunMode::Full,
            DiscoveryMode::OnlyNew => RunMode::IncrementalNew(self.cursors.load(&company)?),
        };

        let mut orchestrator = PipelineOrchestrator::new(
            source,
            details,
            self.store.clone(),
            self.config.pipeline.settings(),
        );
        if let Some((matcher, resume_text)) = &self.resume {
            orchestrator = orchestrator.with_resume_matcher(matcher.clone(), resume_text.clone());
        }

        let summary = orchestrator.run_with_progress(run_mode, progress)?;
        self.cursors.save(&company, &summary.next_cursor)?;

        let report_path = self.config.storage.report_file(&company, today);
        let report_rows =
            export_match_report(self.store.as_ref(), Some(&company), None, &report_path)?;

        Ok(SessionReport {
            summary,
            report_path,
            report_rows,
        })
    }
}

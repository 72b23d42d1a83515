use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::table::PostingTable;
use crate::workflows::pipeline::{JobStore, StoreError, StoredPosting};
use crate::workflows::postings::JobRecord;

const STORE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    postings: Vec<StoredPosting>,
}

#[derive(Debug, Default)]
struct StoreState {
    table: PostingTable,
    dirty: bool,
}

/// Local record store backed by a single JSON document keyed by `(id, company)`.
///
/// Upserts stay in memory; the document is rewritten when match flags are set
/// (the end of a pipeline run), on [`JsonFileJobStore::flush`], and on drop.
#[derive(Debug)]
pub struct JsonFileJobStore {
    path: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonFileJobStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let table = match fs::read_to_string(&path) {
            Ok(raw) => PostingTable::from_rows(parse_store(&path, &raw)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => PostingTable::default(),
            Err(err) => return Err(io_unavailable(&path, err)),
        };

        info!(path = %path.display(), postings = table.len(), "job store opened");
        Ok(Self {
            path,
            state: Mutex::new(StoreState {
                table,
                dirty: false,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes pending upserts to disk. A no-op when nothing changed.
    pub fn flush(&self) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        self.persist(&mut state)
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("job store lock poisoned".to_string()))
    }

    fn persist(&self, state: &mut StoreState) -> Result<(), StoreError> {
        if !state.dirty {
            return Ok(());
        }
        let table = &state.table;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| io_unavailable(parent, err))?;
            }
        }

        let document = StoreFile {
            version: STORE_FORMAT_VERSION,
            postings: table.rows().cloned().collect(),
        };
        let body = serde_json::to_vec_pretty(&document)
            .map_err(|err| StoreError::Unavailable(format!("failed to encode job store: {err}")))?;

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, body).map_err(|err| io_unavailable(&staging, err))?;
        fs::rename(&staging, &self.path).map_err(|err| io_unavailable(&self.path, err))?;
        debug!(path = %self.path.display(), postings = table.len(), "job store written");
        state.dirty = false;
        Ok(())
    }
}

impl Drop for JsonFileJobStore {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            warn!(path = %self.path.display(), error = %err, "pending postings were not written");
        }
    }
}

fn parse_store(path: &Path, raw: &str) -> Result<Vec<StoredPosting>, StoreError> {
    let document: StoreFile = serde_json::from_str(raw).map_err(|err| {
        StoreError::Unavailable(format!("{} is not a valid job store: {err}", path.display()))
    })?;

    if document.version != STORE_FORMAT_VERSION {
        return Err(StoreError::Unavailable(format!(
            "{} uses unsupported store version {}",
            path.display(),
            document.version
        )));
    }

    Ok(document.postings)
}

fn io_unavailable(path: &Path, err: io::Error) -> StoreError {
    StoreError::Unavailable(format!("{}: {err}", path.display()))
}

impl JobStore for JsonFileJobStore {
    fn upsert(&self, record: &JobRecord, company: &str) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.table.upsert(record, company, Utc::now())?;
        state.dirty = true;
        Ok(())
    }

    fn existing_ids(&self, company: &str) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.lock()?.table.existing_ids(company))
    }

    fn set_match_flags(&self, company: &str, matched_ids: &[String]) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let flagged = state.table.set_match_flags(company, matched_ids);
        state.dirty = true;
        debug!(company, flagged, requested = matched_ids.len(), "match flags set");
        self.persist(&mut state)
    }

    fn postings(
        &self,
        company: Option<&str>,
        scraped_within: Option<Duration>,
    ) -> Result<Vec<StoredPosting>, StoreError> {
        Ok(self.lock()?.table.postings(company, scraped_within, Utc::now()))
    }
}

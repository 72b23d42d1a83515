use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CURSOR_FORMAT_VERSION: u32 = 1;
pub const DEFAULT_CURSOR_DEPTH: usize = 5;

/// Sentinel tail remembered between runs: the most recently discovered ids, newest
/// first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryCursor {
    recent_ids: Vec<String>,
}

impl DiscoveryCursor {
    pub fn new(recent_ids: Vec<String>) -> Self {
        Self { recent_ids }
    }

    pub fn recent_ids(&self) -> &[String] {
        &self.recent_ids
    }

    pub fn is_empty(&self) -> bool {
        self.recent_ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.recent_ids.iter().any(|recent| recent == id)
    }

    /// Cursor for the next run: the newest `depth` ids discovered this run, or the
    /// current cursor untouched when nothing new turned up.
    pub fn advance(&self, discovered: &[String], depth: usize) -> Self {
        if discovered.is_empty() {
            return self.clone();
        }

        Self {
            recent_ids: discovered.iter().take(depth.max(1)).cloned().collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CursorFile {
    version: u32,
    recent_ids: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CursorError {
    #[error("failed to access cursor file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cursor file {path} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cursor file {path} uses unsupported format version {found}")]
    UnsupportedVersion { path: PathBuf, found: u32 },
}

pub fn encode_cursor(cursor: &DiscoveryCursor) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&CursorFile {
        version: CURSOR_FORMAT_VERSION,
        recent_ids: cursor.recent_ids.clone(),
    })
}

fn decode_cursor(path: &Path, raw: &str) -> Result<DiscoveryCursor, CursorError> {
    let file: CursorFile = serde_json::from_str(raw).map_err(|source| CursorError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    if file.version != CURSOR_FORMAT_VERSION {
        return Err(CursorError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: file.version,
        });
    }

    Ok(DiscoveryCursor::new(file.recent_ids))
}

/// One cursor file per company under a shared directory.
#[derive(Debug, Clone)]
pub struct CursorStore {
    dir: PathBuf,
}

impl CursorStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, company: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(company)))
    }

    /// Missing file means first run: an empty cursor.
    pub fn load(&self, company: &str) -> Result<DiscoveryCursor, CursorError> {
        let path = self.path_for(company);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(company, path = %path.display(), "no cursor on disk; starting fresh");
                return Ok(DiscoveryCursor::default());
            }
            Err(source) => return Err(CursorError::Io { path, source }),
        };

        decode_cursor(&path, &raw)
    }

    pub fn save(&self, company: &str, cursor: &DiscoveryCursor) -> Result<(), CursorError> {
        let path = self.path_for(company);
        let io_error = |source| CursorError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_error)?;
        let body = encode_cursor(cursor).map_err(|source| CursorError::Malformed {
            path: path.clone(),
            source,
        })?;

        let staging = path.with_extension("json.tmp");
        fs::write(&staging, body).map_err(io_error)?;
        fs::rename(&staging, &path).map_err(io_error)?;

        debug!(company, ids = cursor.recent_ids.len(), "cursor saved");
        Ok(())
    }
}

fn file_stem(company: &str) -> String {
    let stem: String = company
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() {
        "unknown".to_string()
    } else {
        stem
    }
}

//! CSV export of postings flagged as entry level, for review outside the store.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use chrono::Duration;
use serde::Serialize;
use tracing::info;

use crate::workflows::pipeline::{JobStore, StoreError, StoredPosting};

const HEADER: [&str; 8] = [
    "company",
    "id",
    "title",
    "posting_url",
    "posted_date",
    "location",
    "salary_range",
    "scraped_at",
];

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write match report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode match report: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    company: &'a str,
    id: &'a str,
    title: &'a str,
    posting_url: &'a str,
    posted_date: String,
    location: &'a str,
    salary_range: &'a str,
    scraped_at: String,
}

impl<'a> From<&'a StoredPosting> for ReportRow<'a> {
    fn from(posting: &'a StoredPosting) -> Self {
        let record = &posting.record;
        Self {
            company: &record.company,
            id: record.id.as_deref().unwrap_or_default(),
            title: &record.title,
            posting_url: record.posting_url.as_deref().unwrap_or_default(),
            posted_date: record
                .posted_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            location: record.location.as_deref().unwrap_or_default(),
            salary_range: record.salary_range.as_deref().unwrap_or_default(),
            scraped_at: posting.scraped_at.to_rfc3339(),
        }
    }
}

/// Writes the entry-level postings in `postings`, newest scrape first. Returns the
/// number of rows written; the header is always present.
pub fn write_match_report<W: Write>(
    writer: W,
    postings: &[StoredPosting],
) -> Result<usize, ReportError> {
    let mut matched: Vec<&StoredPosting> = postings
        .iter()
        .filter(|posting| posting.entry_level)
        .collect();
    matched.sort_by(|left, right| {
        right
            .scraped_at
            .cmp(&left.scraped_at)
            .then_with(|| left.record.company.cmp(&right.record.company))
            .then_with(|| left.record.id.cmp(&right.record.id))
    });

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(HEADER)?;
    for posting in &matched {
        csv_writer.serialize(ReportRow::from(*posting))?;
    }
    csv_writer.flush()?;

    Ok(matched.len())
}

/// Pulls matches from `store` and writes them to `path`, creating parent
/// directories as needed.
pub fn export_match_report<J: JobStore + ?Sized>(
    store: &J,
    company: Option<&str>,
    scraped_within: Option<Duration>,
    path: impl AsRef<Path>,
) -> Result<usize, ReportError> {
    let path = path.as_ref();
    let postings = store.postings(company, scraped_within)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let rows = write_match_report(File::create(path)?, &postings)?;
    info!(path = %path.display(), rows, company = company.unwrap_or("all"), "match report written");
    Ok(rows)
}

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Dedup and merge key for a posting: the source-assigned id scoped by company.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobKey {
    pub id: String,
    pub company: String,
}

impl JobKey {
    pub fn new(id: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            company: company.into(),
        }
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.company, self.id)
    }
}

/// Normalized posting shared by every site adapter.
///
/// Adapters create a partial record from a listing page (title, id, url) and enrich
/// it later with [`JobRecord::merge_detail`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub company: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posting_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_qualifications: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsibilities: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
}

impl JobRecord {
    /// Partial record as produced from a listing page.
    pub fn listing(
        company: impl Into<String>,
        title: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            company: company.into(),
            title: title.into(),
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn with_posting_url(mut self, url: impl Into<String>) -> Self {
        self.posting_url = Some(url.into());
        self
    }

    /// Storage key: [`JobRecord::listing_key`] scoped by company, so url-only
    /// adapters dedupe the same way discovery sees them.
    pub fn key(&self) -> Option<JobKey> {
        let id = self.listing_key()?;
        if self.company.is_empty() {
            return None;
        }
        Some(JobKey::new(id, self.company.as_str()))
    }

    /// Identifier used by incremental discovery; falls back to the posting url for
    /// adapters that only expose links.
    pub fn listing_key(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or_else(|| self.posting_url.as_deref().filter(|url| !url.is_empty()))
    }

    /// Overlays a detail payload onto this listing record. Known values in `detail`
    /// win; absent values never erase what the listing already had.
    pub fn merge_detail(&mut self, detail: JobRecord) {
        let JobRecord {
            company,
            title,
            id,
            posting_url,
            posted_date,
            description,
            requirements,
            extra_qualifications,
            responsibilities,
            location,
            locations,
            team,
            teams,
            level,
            salary_range,
        } = detail;

        if !company.trim().is_empty() {
            self.company = company;
        }
        if !title.trim().is_empty() {
            self.title = title;
        }

        overlay(&mut self.id, id);
        overlay(&mut self.posting_url, posting_url);
        overlay(&mut self.posted_date, posted_date);
        overlay(&mut self.description, description);
        overlay(&mut self.requirements, requirements);
        overlay(&mut self.extra_qualifications, extra_qualifications);
        overlay(&mut self.responsibilities, responsibilities);
        overlay(&mut self.location, location);
        overlay(&mut self.locations, locations);
        overlay(&mut self.team, team);
        overlay(&mut self.teams, teams);
        overlay(&mut self.level, level);
        overlay(&mut self.salary_range, salary_range);
    }

    pub fn merged_with(mut self, detail: JobRecord) -> Self {
        self.merge_detail(detail);
        self
    }

    /// Human readable pointer used in logs and reports.
    pub fn printable(&self) -> String {
        match (&self.posting_url, &self.id) {
            (Some(url), _) => url.clone(),
            (None, Some(id)) => format!("{} #{}", self.company, id),
            (None, None) => format!("{} \"{}\"", self.company, self.title),
        }
    }
}

fn overlay<T>(slot: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}

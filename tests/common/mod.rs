#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use entry_scout::workflows::pipeline::{
    DetailError, DetailFetcher, ListingPage, ListingSource, SourceError,
};
use entry_scout::workflows::postings::JobRecord;

/// Site adapter double serving fixed pages of listings, newest first.
pub struct StaticBoard {
    company: String,
    pages: Vec<Vec<JobRecord>>,
    total: usize,
    down_pages: BTreeSet<usize>,
    requested: Mutex<Vec<usize>>,
}

impl StaticBoard {
    pub fn new(company: &str, listings: Vec<JobRecord>, page_size: usize) -> Self {
        let total = listings.len();
        Self {
            company: company.to_string(),
            pages: listings.chunks(page_size).map(<[JobRecord]>::to_vec).collect(),
            total,
            down_pages: BTreeSet::new(),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn with_page_down(mut self, page: usize) -> Self {
        self.down_pages.insert(page);
        self
    }

    pub fn requested_pages(&self) -> Vec<usize> {
        self.requested.lock().expect("board mutex poisoned").clone()
    }
}

impl ListingSource for StaticBoard {
    fn company(&self) -> &str {
        &self.company
    }

    fn fetch_page(&self, page_index: usize) -> Result<ListingPage, SourceError> {
        self.requested
            .lock()
            .expect("board mutex poisoned")
            .push(page_index);
        if self.down_pages.contains(&page_index) {
            return Err(SourceError::Request {
                page: page_index,
                reason: "HTTP 502".to_string(),
            });
        }

        Ok(ListingPage {
            items: self
                .pages
                .get(page_index - 1)
                .cloned()
                .unwrap_or_default(),
            total_count: Some(self.total),
        })
    }
}

/// Detail double keyed by listing id; ids without an entry are not found.
#[derive(Default)]
pub struct DetailPages {
    pages: BTreeMap<String, JobRecord>,
    broken: BTreeSet<String>,
}

impl DetailPages {
    pub fn for_listings(listings: &[JobRecord]) -> Self {
        let pages = listings
            .iter()
            .filter_map(|listing| listing.id.clone())
            .map(|id| (id, JobRecord::default()))
            .collect();
        Self {
            pages,
            broken: BTreeSet::new(),
        }
    }

    pub fn requirements(mut self, id: &str, lines: &[&str]) -> Self {
        let detail = self.pages.entry(id.to_string()).or_default();
        detail.requirements = Some(lines.iter().map(|line| line.to_string()).collect());
        self
    }

    pub fn broken(mut self, id: &str) -> Self {
        self.broken.insert(id.to_string());
        self
    }
}

impl DetailFetcher for DetailPages {
    fn fetch_detail(&self, partial: &JobRecord) -> Result<Option<JobRecord>, DetailError> {
        let id = partial.id.as_deref().unwrap_or_default();
        if self.broken.contains(id) {
            return Err(DetailError::Parse("unexpected markup".to_string()));
        }
        Ok(self.pages.get(id).cloned())
    }
}

pub fn posting(company: &str, number: usize, title: &str) -> JobRecord {
    JobRecord::listing(company, title, format!("{number:04}"))
        .with_posting_url(format!("https://careers.example.com/{company}/{number:04}"))
}

/// Twenty-five listings: #3 is senior, #7 is a research role, #10 lists a BS, #15
/// asks for three years.
pub fn mixed_board(company: &str) -> (Vec<JobRecord>, DetailPages) {
    let listings: Vec<JobRecord> = (1..=25)
        .map(|number| {
            let title = match number {
                3 => "Senior Software Engineer",
                7 => "Research Scientist, Compilers",
                10 => "Software Engineer I",
                _ => "Software Engineer",
            };
            posting(company, number, title)
        })
        .collect();

    let details = DetailPages::for_listings(&listings)
        .requirements("0010", &["BS in CS"])
        .requirements("0015", &["3+ years of experience with distributed systems"]);
    (listings, details)
}

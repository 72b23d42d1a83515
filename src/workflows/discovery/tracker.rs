use std::collections::HashSet;

use super::cursor::DiscoveryCursor;

/// Returns the prefix of `fresh_ids` that precedes the first id remembered by the
/// cursor. `fresh_ids` must be in the site's newest-first order.
///
/// If every sentinel id has disappeared from the listing (expired or filled) the
/// resume point cannot be found and the whole listing comes back as new; downstream
/// upserts make the repeat work harmless.
pub fn find_new(fresh_ids: &[String], cursor: &DiscoveryCursor) -> Vec<String> {
    let recent: HashSet<&str> = cursor.recent_ids().iter().map(String::as_str).collect();

    fresh_ids
        .iter()
        .take_while(|id| !recent.contains(id.as_str()))
        .cloned()
        .collect()
}

/// Result of scanning one listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageScan {
    /// Number of leading entries on the page that are new.
    pub new_count: usize,
    pub boundary_reached: bool,
}

/// Page-at-a-time version of [`find_new`] used while paginating, so the caller can
/// stop fetching once the sentinel boundary shows up.
#[derive(Debug, Clone)]
pub struct DiscoveryTracker {
    cursor: DiscoveryCursor,
    boundary_reached: bool,
}

impl DiscoveryTracker {
    pub fn new(cursor: DiscoveryCursor) -> Self {
        Self {
            cursor,
            boundary_reached: false,
        }
    }

    pub fn boundary_reached(&self) -> bool {
        self.boundary_reached
    }

    /// Scans the ids of the next page. Entries without an id are passed as `None`
    /// and always count as new since they can never match a sentinel.
    pub fn scan_page<'a, I>(&mut self, ids: I) -> PageScan
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        if self.boundary_reached {
            return PageScan {
                new_count: 0,
                boundary_reached: true,
            };
        }

        let mut new_count = 0;
        for id in ids {
            if id.is_some_and(|id| self.cursor.contains(id)) {
                self.boundary_reached = true;
                break;
            }
            new_count += 1;
        }

        PageScan {
            new_count,
            boundary_reached: self.boundary_reached,
        }
    }
}

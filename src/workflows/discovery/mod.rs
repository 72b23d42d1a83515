//! Incremental "only new" discovery over a remembered tail of recent ids.

mod cursor;
mod tracker;

pub use cursor::{
    encode_cursor, CursorError, CursorStore, DiscoveryCursor, CURSOR_FORMAT_VERSION,
    DEFAULT_CURSOR_DEPTH,
};
pub use tracker::{find_new, DiscoveryTracker, PageScan};

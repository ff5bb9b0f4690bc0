//! Page assembly with the limit+1 probe.

use serde::Serialize;

use super::cursor::{Cursor, PageItem};

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Default page size when the caller specifies none.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// A feed-read request as it arrives from the transport layer.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    /// Opaque cursor from a previous page, if resuming a scan.
    pub cursor: Option<String>,
    /// Requested page size; zero means the default, larger values clamp.
    pub limit: usize,
}

impl PageRequest {
    /// Effective page size after clamping.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        if self.limit == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.limit.min(MAX_PAGE_SIZE)
        }
    }
}

/// One page of an ordered feed.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// At most the requested limit, in `(ordering_key desc, id desc)` order.
    pub items: Vec<T>,
    /// Token resuming the scan after the last item; absent at end of scan.
    pub next_cursor: Option<String>,
}

/// Builds a page from a `limit + 1` probe.
///
/// The caller fetches up to `limit + 1` rows ordered strictly after the
/// cursor position. An extra row proves more data exists without a separate
/// count query: truncate to `limit` and anchor `next_cursor` on the last
/// retained row. Fewer rows means the scan is complete as of this read.
pub fn build_page<T: PageItem>(mut rows: Vec<T>, limit: usize) -> Page<T> {
    let next_cursor = if rows.len() > limit {
        rows.truncate(limit);
        rows.last().map(|row| Cursor::after(row).encode())
    } else {
        None
    };

    Page { items: rows, next_cursor }
}

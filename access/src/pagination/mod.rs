//! Cursor-based pagination for ordered feeds.
//!
//! Feeds are scanned in `(ordering_key desc, id desc)` order; the id
//! tie-break keeps the order total, so pages stay stable under concurrent
//! inserts. Cursors are pure functions of the emitted page and carry no
//! server-side state.

pub mod cursor;
pub mod page;

pub use cursor::{Cursor, CursorError, PageItem};
pub use page::{build_page, Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

//! Opaque pagination cursors.
//!
//! A cursor carries the `(ordering key, id)` position of the last row a
//! page emitted, enough to resume a strictly ordered scan without skipping
//! or duplicating rows inserted in the meantime. The token is opaque at the
//! API boundary: callers must not parse it, so the encoding can change
//! without breaking them.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// A malformed or stale pagination token.
///
/// Not retryable with the same cursor; the caller restarts the scan from
/// the beginning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pagination cursor")]
pub struct CursorError;

/// Decoded scan position: the last row the previous page emitted.
///
/// Ordering-key ties are broken by the id, so the scan order
/// `(ordering_key desc, id desc)` is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub last_id: Uuid,
    pub last_key: DateTime<Utc>,
}

impl Cursor {
    /// Builds the cursor pointing just after `item`.
    pub fn after<T: PageItem>(item: &T) -> Self {
        Self {
            last_id: item.id(),
            last_key: item.ordering_key(),
        }
    }

    /// Encodes this position as an opaque token.
    #[must_use]
    pub fn encode(&self) -> String {
        let raw = format!("{}_{}", self.last_key.timestamp_micros(), self.last_id);
        URL_SAFE_NO_PAD.encode(raw)
    }

    /// Decodes an opaque token back into a scan position.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let raw = URL_SAFE_NO_PAD.decode(token).map_err(|_| CursorError)?;
        let raw = String::from_utf8(raw).map_err(|_| CursorError)?;

        let (micros, id) = raw.split_once('_').ok_or(CursorError)?;
        let micros: i64 = micros.parse().map_err(|_| CursorError)?;
        let last_key = DateTime::from_timestamp_micros(micros).ok_or(CursorError)?;
        let last_id: Uuid = id.parse().map_err(|_| CursorError)?;

        Ok(Self { last_id, last_key })
    }
}

/// Row type that can anchor a cursor.
pub trait PageItem {
    /// Unique secondary key (tie-breaker).
    fn id(&self) -> Uuid;
    /// Primary ordering key of the feed.
    fn ordering_key(&self) -> DateTime<Utc>;
}

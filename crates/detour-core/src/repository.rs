use crate::error::Result;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A stored URL record in the repository.
///
/// Records are immutable after creation; expiry removes them, nothing
/// updates them in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The destination URL the short code redirects to.
    pub original_url: String,
    /// When the record was created.
    pub created_at: Timestamp,
    /// When the record stops being live. Always after `created_at`.
    pub expire_at: Timestamp,
}

impl UrlRecord {
    /// Reports whether the record is past its expiry instant.
    ///
    /// A record is live up to and including `expire_at` itself.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expire_at
    }
}

/// A single recorded resolution of a short code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    /// When the short code was resolved.
    pub at: Timestamp,
    /// Where the resolution came from (e.g. a referrer), when known.
    pub source: Option<String>,
}

#[async_trait]
pub trait Repository: Send + Sync + 'static {
    /// Inserts a new URL record.
    ///
    /// The liveness check and the insert happen as one atomic step per
    /// key, so of two racing inserts for the same code exactly one can
    /// succeed. Returns `Err(ShortcodeConflict)` if a live record
    /// already holds the code; an expired record is replaced.
    async fn insert(&self, code: &ShortCode, record: UrlRecord) -> Result<()>;

    /// Retrieves the record for a short code.
    ///
    /// Returns `None` for absent or expired codes. Implementations may
    /// evict an expired record as part of the lookup.
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;

    /// Reports whether a live record exists for the code, applying the
    /// same expiry discipline as [`get`](Repository::get).
    async fn exists(&self, code: &ShortCode) -> Result<bool>;

    /// Appends a click event to a live record. A no-op for absent or
    /// expired codes.
    async fn record_click(&self, code: &ShortCode, click: ClickEvent) -> Result<()>;

    /// Returns the click events recorded for a live code, oldest first.
    /// Empty for absent or expired codes.
    async fn clicks(&self, code: &ShortCode) -> Result<Vec<ClickEvent>>;
}

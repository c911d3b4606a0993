use crate::error::Result;
use crate::repository::UrlRecord;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone)]
pub struct ShortenParams {
    /// The destination URL to shorten.
    pub original_url: String,
    /// Validity in minutes. Must be positive when supplied; the
    /// service default applies when omitted.
    pub validity_minutes: Option<i64>,
    /// Optional caller-chosen short code, validated before use.
    pub custom_alias: Option<String>,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a shortened URL and returns the chosen short code.
    async fn shorten(&self, params: ShortenParams) -> Result<ShortCode>;

    /// Resolves a short code to its stored record.
    /// Returns `None` if the code does not exist or has expired.
    async fn resolve(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;

    /// Reports whether a live record exists for the code.
    async fn exists(&self, code: &ShortCode) -> Result<bool>;
}

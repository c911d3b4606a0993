use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShortenError>;

/// Errors produced by the mapping store and its creation path.
///
/// Every variant is a client-input or state-conflict error; none are
/// transient, and the caller can always retry with corrected input.
/// Absent-or-expired lookups are not errors: read operations report
/// them as `Ok(None)` / `Ok(false)`.
#[derive(Debug, Clone, Error)]
pub enum ShortenError {
    #[error("url is required")]
    MissingUrl,
    #[error("invalid url format: {0}")]
    InvalidUrlFormat(String),
    #[error("validity must be a positive number of minutes, got {0}")]
    InvalidValidity(i64),
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
    #[error("short code already exists: {0}")]
    ShortcodeConflict(String),
    #[error("no free short code found after {0} attempts")]
    GenerationExhausted(u32),
}

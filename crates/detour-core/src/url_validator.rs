use crate::error::ShortenError;
use url::Url;

/// Validates that `candidate` is a well-formed absolute URL with a
/// scheme and a host.
pub fn validate_url(candidate: &str) -> Result<(), ShortenError> {
    let candidate = candidate.trim();

    if candidate.is_empty() {
        return Err(ShortenError::MissingUrl);
    }

    let parsed =
        Url::parse(candidate).map_err(|e| ShortenError::InvalidUrlFormat(e.to_string()))?;

    if !parsed.has_host() {
        return Err(ShortenError::InvalidUrlFormat(format!(
            "missing host: {}",
            candidate
        )));
    }

    Ok(())
}

/// Predicate form of [`validate_url`].
pub fn is_valid_url(candidate: &str) -> bool {
    validate_url(candidate).is_ok()
}

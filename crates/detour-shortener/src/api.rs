//! Framework-free request/response boundary.
//!
//! The HTTP layer proper lives outside this repository; this module
//! defines the shapes it exchanges with the mapping store and the
//! client-facing error strings, so a transport only has to do JSON and
//! status codes.

use crate::service::ShortenerService;
use detour_core::{
    Clock, Repository, ShortCode, ShortenError, ShortenParams, Shortener, SystemClock,
};
use detour_generator::Generator;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Message reported for absent or expired short codes.
pub const NOT_FOUND: &str = "Short URL not found or expired";

/// Body of a create request:
/// `{ "url": ..., "validity": ..., "shortcode": ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequest {
    pub url: String,
    /// Validity in minutes; the service default applies when omitted.
    pub validity: Option<i64>,
    pub shortcode: Option<String>,
}

/// Body of a successful create response. `expires_at` serializes as an
/// ISO-8601 timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
    pub short_url: String,
    pub shortcode: String,
    pub expires_at: Timestamp,
}

/// Structured error payload with the client-facing message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn not_found() -> Self {
        Self {
            error: NOT_FOUND.to_owned(),
        }
    }
}

impl From<ShortenError> for ErrorResponse {
    fn from(error: ShortenError) -> Self {
        Self {
            error: client_message(&error).to_owned(),
        }
    }
}

/// Maps an error to the message the boundary reports to clients.
pub fn client_message(error: &ShortenError) -> &'static str {
    match error {
        ShortenError::MissingUrl => "URL is required",
        ShortenError::InvalidUrlFormat(_) => "Invalid URL format",
        ShortenError::InvalidValidity(_) => "Validity must be a positive integer",
        ShortenError::InvalidShortCode(_) => "Shortcode must be 4-20 alphanumeric characters",
        ShortenError::ShortcodeConflict(_) => "Shortcode already exists",
        ShortenError::GenerationExhausted(_) => "Could not allocate a free shortcode",
    }
}

/// The two boundary operations of the store.
///
/// `create` backs the shortening endpoint and `resolve` backs the
/// redirect endpoint; both return the exact payloads the excluded
/// transport layer forwards to clients.
#[derive(Debug, Clone)]
pub struct Api<R, G, C = SystemClock> {
    service: ShortenerService<R, G, C>,
    base_url: String,
}

impl<R, G, C> Api<R, G, C>
where
    R: Repository + Clone,
    G: Generator + Clone,
    C: Clock + Clone + 'static,
{
    /// Creates the boundary over a service, with the base URL short
    /// links are advertised under.
    pub fn new(service: ShortenerService<R, G, C>, base_url: impl Into<String>) -> Self {
        Self {
            service,
            base_url: base_url.into(),
        }
    }

    /// Creates a mapping and describes it for the client.
    pub async fn create(&self, request: CreateRequest) -> Result<CreateResponse, ErrorResponse> {
        let params = ShortenParams {
            original_url: request.url,
            validity_minutes: request.validity,
            custom_alias: request.shortcode,
        };

        let code = self.service.shorten(params).await?;

        // Freshly inserted, so this lookup only misses if the whole
        // validity elapsed between the two calls.
        let Some(record) = self.service.resolve(&code).await? else {
            return Err(ErrorResponse::not_found());
        };

        Ok(CreateResponse {
            short_url: code.to_url(&self.base_url),
            shortcode: code.to_string(),
            expires_at: record.expire_at,
        })
    }

    /// Resolves a shortcode path segment to the destination URL the
    /// client should be redirected to, recording the click.
    pub async fn resolve(
        &self,
        shortcode: &str,
        source: Option<&str>,
    ) -> Result<String, ErrorResponse> {
        // A syntactically invalid segment can't name a live record.
        let Ok(code) = ShortCode::new(shortcode) else {
            return Err(ErrorResponse::not_found());
        };

        match self.service.resolve_tracked(&code, source).await? {
            Some(record) => Ok(record.original_url),
            None => Err(ErrorResponse::not_found()),
        }
    }
}

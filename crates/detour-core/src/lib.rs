//! Core types and traits for the Detour URL shortener.
//!
//! This crate provides the shared vocabulary used by the code
//! generator, the storage backend, and the shortener service.

pub mod clock;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;
pub mod url_validator;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Result, ShortenError};
pub use repository::{ClickEvent, Repository, UrlRecord};
pub use shortcode::ShortCode;
pub use shortener::{ShortenParams, Shortener};
pub use url_validator::{is_valid_url, validate_url};

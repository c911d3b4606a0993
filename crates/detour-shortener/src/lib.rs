//! URL shortener service implementation.
//!
//! This crate wires the code generator and the mapping store together:
//! input validation, collision-safe creation with bounded retry,
//! click-tracked resolution, and the framework-free request/response
//! boundary. Core types are re-exported from `detour_core`.

pub mod api;
pub mod service;

pub use service::{ShortenerConfig, ShortenerService};

//! Short code generation.
//!
//! Generators are pure with respect to storage: they produce candidate
//! codes without knowing which ones are taken. The creation path owns
//! collision detection and retry.

pub mod random;

pub use random::RandomGenerator;

use detour_core::ShortCode;

/// Trait for generating short codes.
///
/// Implementations don't interact with storage and make no global
/// uniqueness guarantee; the caller re-checks generated codes against
/// the store before committing to one.
pub trait Generator: Send + Sync + 'static {
    /// Generates a candidate short code.
    fn generate(&self) -> ShortCode;
}

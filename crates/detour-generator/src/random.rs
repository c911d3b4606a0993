use crate::Generator;
use detour_core::ShortCode;
use std::iter;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated codes unless configured otherwise.
pub const DEFAULT_LENGTH: usize = 6;

/// A pseudo-random alphanumeric short code generator.
///
/// Codes are fixed-length and URL-safe. Collisions with stored codes
/// are possible; the creation path retries with a fresh code when one
/// occurs.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    /// Creates a generator producing codes of [`DEFAULT_LENGTH`].
    pub fn new() -> Self {
        Self {
            length: DEFAULT_LENGTH,
        }
    }

    /// Creates a generator producing codes of the given length.
    ///
    /// The length must stay within the valid short code range (4-20).
    pub fn with_length(length: usize) -> Self {
        debug_assert!(
            ShortCode::is_valid(&"a".repeat(length)),
            "generator length must produce valid short codes"
        );
        Self { length }
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> ShortCode {
        let code: String = iter::repeat_with(|| CHARSET[rand::random_range(0..CHARSET.len())] as char)
            .take(self.length)
            .collect();

        // The charset is a strict subset of the short code alphabet.
        ShortCode::new_unchecked(code)
    }
}

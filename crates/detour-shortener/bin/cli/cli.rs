use clap::Parser;

pub const BASE_URL_ENV: &str = "DETOUR_BASE_URL";
pub const CODE_LENGTH_ENV: &str = "DETOUR_CODE_LENGTH";
pub const DEFAULT_VALIDITY_ENV: &str = "DETOUR_DEFAULT_VALIDITY_MINUTES";
pub const MAX_ATTEMPTS_ENV: &str = "DETOUR_MAX_GENERATION_ATTEMPTS";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Parser)]
#[command(name = "detour", about = "Interactive shell over the Detour mapping store")]
pub struct CLI {
    /// Base URL prepended to shortcodes in create responses.
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Length of generated shortcodes (4-20).
    #[arg(
        long,
        env = CODE_LENGTH_ENV,
        default_value_t = detour_generator::random::DEFAULT_LENGTH
    )]
    pub code_length: usize,

    /// Validity in minutes applied when a create omits one.
    #[arg(
        long,
        env = DEFAULT_VALIDITY_ENV,
        default_value_t = detour_shortener::service::DEFAULT_VALIDITY_MINUTES
    )]
    pub default_validity: i64,

    /// Attempts at finding a free generated code before giving up.
    #[arg(
        long,
        env = MAX_ATTEMPTS_ENV,
        default_value_t = detour_shortener::service::DEFAULT_MAX_GENERATION_ATTEMPTS
    )]
    pub max_generation_attempts: u32,
}

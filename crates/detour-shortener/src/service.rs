use async_trait::async_trait;
use detour_core::{
    validate_url, ClickEvent, Clock, Repository, Result, ShortCode, ShortenError, ShortenParams,
    Shortener, SystemClock, UrlRecord,
};
use detour_generator::Generator;
use jiff::{SignedDuration, Timestamp};
use std::sync::Arc;
use tracing::{info, warn};
use typed_builder::TypedBuilder;

/// Validity applied when a request doesn't carry one.
pub const DEFAULT_VALIDITY_MINUTES: i64 = 30;

/// Attempts at finding a free generated code before giving up.
pub const DEFAULT_MAX_GENERATION_ATTEMPTS: u32 = 5;

/// Tuning knobs for [`ShortenerService`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerConfig {
    #[builder(default = DEFAULT_VALIDITY_MINUTES)]
    pub default_validity_minutes: i64,
    #[builder(default = DEFAULT_MAX_GENERATION_ATTEMPTS)]
    pub max_generation_attempts: u32,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A concrete implementation of the `Shortener` trait.
///
/// Wraps a `Repository`, a `Generator`, and a `Clock` to handle URL
/// validation, expiry stamping, and short code assignment.
///
/// Generated codes are not assumed unique: the repository insert
/// doubles as the collision check, and creation retries with a fresh
/// code a bounded number of times before surfacing
/// `GenerationExhausted`.
#[derive(Debug, Clone)]
pub struct ShortenerService<R, G, C = SystemClock> {
    repository: Arc<R>,
    generator: Arc<G>,
    clock: C,
    config: ShortenerConfig,
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    /// Creates a service on the system clock with default settings.
    pub fn new(repository: R, generator: G) -> Self {
        Self::with_config(repository, generator, ShortenerConfig::default())
    }

    /// Creates a service on the system clock with custom settings.
    pub fn with_config(repository: R, generator: G, config: ShortenerConfig) -> Self {
        Self::with_clock(repository, generator, SystemClock, config)
    }
}

impl<R: Repository, G: Generator, C: Clock + 'static> ShortenerService<R, G, C> {
    /// Creates a service reading time from `clock`.
    pub fn with_clock(repository: R, generator: G, clock: C, config: ShortenerConfig) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            clock,
            config,
        }
    }

    fn validity_minutes(&self, requested: Option<i64>) -> Result<i64> {
        match requested {
            None => Ok(self.config.default_validity_minutes),
            Some(minutes) if minutes > 0 => Ok(minutes),
            Some(minutes) => Err(ShortenError::InvalidValidity(minutes)),
        }
    }

    /// Computes `created_at + minutes` without panicking: a validity
    /// large enough to overflow the timestamp range is rejected the
    /// same way as a non-positive one.
    fn expiry_for(created_at: Timestamp, minutes: i64) -> Result<Timestamp> {
        let seconds = minutes
            .checked_mul(60)
            .ok_or(ShortenError::InvalidValidity(minutes))?;
        created_at
            .checked_add(SignedDuration::from_secs(seconds))
            .map_err(|_| ShortenError::InvalidValidity(minutes))
    }

    /// Resolves a short code and records the click, attributing it to
    /// `source` when known.
    pub async fn resolve_tracked(
        &self,
        code: &ShortCode,
        source: Option<&str>,
    ) -> Result<Option<UrlRecord>> {
        let Some(record) = self.repository.get(code).await? else {
            return Ok(None);
        };

        let click = ClickEvent {
            at: self.clock.now(),
            source: source.map(str::to_owned),
        };
        self.repository.record_click(code, click).await?;

        info!(code = %code, url = %record.original_url, "resolved short code");
        Ok(Some(record))
    }

    /// Returns the clicks recorded for a code, oldest first.
    pub async fn clicks(&self, code: &ShortCode) -> Result<Vec<ClickEvent>> {
        self.repository.clicks(code).await
    }
}

#[async_trait]
impl<R: Repository, G: Generator, C: Clock + Clone + 'static> Shortener
    for ShortenerService<R, G, C>
{
    async fn shorten(&self, params: ShortenParams) -> Result<ShortCode> {
        validate_url(&params.original_url)?;
        let validity = self.validity_minutes(params.validity_minutes)?;

        let created_at = self.clock.now();
        let record = UrlRecord {
            original_url: params.original_url,
            created_at,
            expire_at: Self::expiry_for(created_at, validity)?,
        };

        match params.custom_alias {
            Some(alias) => {
                let code = ShortCode::new(alias)?;
                self.repository.insert(&code, record).await?;
                info!(code = %code, "created short code");
                Ok(code)
            }
            None => {
                for _ in 0..self.config.max_generation_attempts {
                    let code = self.generator.generate();
                    match self.repository.insert(&code, record.clone()).await {
                        Ok(()) => {
                            info!(code = %code, "created short code");
                            return Ok(code);
                        }
                        Err(ShortenError::ShortcodeConflict(_)) => {
                            warn!(code = %code, "generated short code collided, retrying");
                        }
                        Err(other) => return Err(other),
                    }
                }

                Err(ShortenError::GenerationExhausted(
                    self.config.max_generation_attempts,
                ))
            }
        }
    }

    async fn resolve(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        self.repository.get(code).await
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        self.repository.exists(code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detour_core::ManualClock;
    use detour_generator::RandomGenerator;
    use detour_storage::InMemoryRepository;
    use jiff::Timestamp;
    use std::sync::Mutex;

    type TestService<G> = ShortenerService<InMemoryRepository<ManualClock>, G, ManualClock>;

    fn clock() -> ManualClock {
        ManualClock::new(Timestamp::from_second(0).unwrap())
    }

    fn service(clock: &ManualClock) -> TestService<RandomGenerator> {
        service_with(clock, RandomGenerator::new(), ShortenerConfig::default())
    }

    fn service_with<G: Generator>(
        clock: &ManualClock,
        generator: G,
        config: ShortenerConfig,
    ) -> TestService<G> {
        ShortenerService::with_clock(
            InMemoryRepository::with_clock(clock.clone()),
            generator,
            clock.clone(),
            config,
        )
    }

    fn params(url: &str) -> ShortenParams {
        ShortenParams {
            original_url: url.to_string(),
            validity_minutes: None,
            custom_alias: None,
        }
    }

    /// Always produces the same code, so every attempt after the first
    /// insert collides.
    struct FixedGenerator(&'static str);

    impl Generator for FixedGenerator {
        fn generate(&self) -> ShortCode {
            ShortCode::new_unchecked(self.0)
        }
    }

    /// Produces a scripted sequence of codes.
    struct ScriptedGenerator(Mutex<Vec<&'static str>>);

    impl ScriptedGenerator {
        fn new(mut codes: Vec<&'static str>) -> Self {
            codes.reverse();
            Self(Mutex::new(codes))
        }
    }

    impl Generator for ScriptedGenerator {
        fn generate(&self) -> ShortCode {
            let code = self.0.lock().unwrap().pop().expect("script exhausted");
            ShortCode::new_unchecked(code)
        }
    }

    #[tokio::test]
    async fn shorten_with_generated_code_resolves_immediately() {
        let service = service(&clock());

        let code = service.shorten(params("https://example.com")).await.unwrap();

        assert!(ShortCode::is_valid(code.as_str()));
        let record = service.resolve(&code).await.unwrap().unwrap();
        assert_eq!(record.original_url, "https://example.com");
    }

    #[tokio::test]
    async fn shorten_with_custom_alias() {
        let service = service(&clock());

        let code = service
            .shorten(ShortenParams {
                custom_alias: Some("valid_Code-1".to_string()),
                ..params("https://example.com")
            })
            .await
            .unwrap();

        assert_eq!(code.as_str(), "valid_Code-1");
    }

    #[tokio::test]
    async fn shorten_with_malformed_alias_fails() {
        let service = service(&clock());

        let err = service
            .shorten(ShortenParams {
                custom_alias: Some("ab".to_string()),
                ..params("https://example.com")
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenError::InvalidShortCode(_)));
    }

    #[tokio::test]
    async fn shorten_with_duplicate_alias_fails() {
        let service = service(&clock());
        let taken = ShortenParams {
            custom_alias: Some("my-alias".to_string()),
            ..params("https://example1.com")
        };

        service.shorten(taken.clone()).await.unwrap();
        let err = service
            .shorten(ShortenParams {
                original_url: "https://example2.com".to_string(),
                ..taken
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenError::ShortcodeConflict(_)));
    }

    #[tokio::test]
    async fn shorten_with_missing_url_fails() {
        let service = service(&clock());

        let err = service.shorten(params("")).await.unwrap_err();
        assert!(matches!(err, ShortenError::MissingUrl));
    }

    #[tokio::test]
    async fn shorten_with_invalid_url_fails() {
        let service = service(&clock());

        let err = service.shorten(params("not a url")).await.unwrap_err();
        assert!(matches!(err, ShortenError::InvalidUrlFormat(_)));
    }

    #[tokio::test]
    async fn shorten_with_nonpositive_validity_fails() {
        let service = service(&clock());

        for validity in [0, -5] {
            let err = service
                .shorten(ShortenParams {
                    validity_minutes: Some(validity),
                    ..params("https://example.com")
                })
                .await
                .unwrap_err();
            assert!(matches!(err, ShortenError::InvalidValidity(v) if v == validity));
        }
    }

    #[tokio::test]
    async fn shorten_with_overflowing_validity_fails() {
        let service = service(&clock());

        // The first overflows the seconds conversion, the second the
        // timestamp range itself. Both must surface as errors, not
        // panics.
        for validity in [i64::MAX, 10_000_000_000_000] {
            let err = service
                .shorten(ShortenParams {
                    validity_minutes: Some(validity),
                    ..params("https://example.com")
                })
                .await
                .unwrap_err();
            assert!(matches!(err, ShortenError::InvalidValidity(v) if v == validity));
        }
    }

    #[tokio::test]
    async fn validity_defaults_to_thirty_minutes() {
        let clock = clock();
        let service = service(&clock);

        let code = service.shorten(params("https://example.com")).await.unwrap();

        let record = service.resolve(&code).await.unwrap().unwrap();
        assert_eq!(record.created_at, clock.now());
        assert_eq!(record.expire_at, clock.now() + SignedDuration::from_mins(30));
    }

    #[tokio::test]
    async fn record_expires_after_validity() {
        let clock = clock();
        let service = service(&clock);

        let code = service
            .shorten(ShortenParams {
                validity_minutes: Some(1),
                ..params("https://example.com")
            })
            .await
            .unwrap();

        clock.advance(SignedDuration::from_secs(61));

        assert!(service.resolve(&code).await.unwrap().is_none());
        assert!(!service.exists(&code).await.unwrap());
    }

    #[tokio::test]
    async fn record_live_until_expiry_instant() {
        let clock = clock();
        let service = service(&clock);

        let code = service
            .shorten(ShortenParams {
                validity_minutes: Some(1),
                ..params("https://example.com")
            })
            .await
            .unwrap();

        clock.advance(SignedDuration::from_secs(60));

        assert!(service.resolve(&code).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn alias_reusable_after_expiry() {
        let clock = clock();
        let service = service(&clock);
        let alias = ShortenParams {
            validity_minutes: Some(1),
            custom_alias: Some("my-alias".to_string()),
            ..params("https://old.com")
        };

        service.shorten(alias.clone()).await.unwrap();
        clock.advance(SignedDuration::from_mins(2));

        let code = service
            .shorten(ShortenParams {
                original_url: "https://new.com".to_string(),
                ..alias
            })
            .await
            .unwrap();

        let record = service.resolve(&code).await.unwrap().unwrap();
        assert_eq!(record.original_url, "https://new.com");
    }

    #[tokio::test]
    async fn generation_retries_past_collisions() {
        let clock = clock();
        let service = service_with(
            &clock,
            ScriptedGenerator::new(vec!["code-a", "code-a", "code-b"]),
            ShortenerConfig::default(),
        );

        let first = service.shorten(params("https://example1.com")).await.unwrap();
        let second = service.shorten(params("https://example2.com")).await.unwrap();

        assert_eq!(first.as_str(), "code-a");
        assert_eq!(second.as_str(), "code-b");
    }

    #[tokio::test]
    async fn generation_exhaustion_is_bounded() {
        let clock = clock();
        let service = service_with(
            &clock,
            FixedGenerator("stuck1"),
            ShortenerConfig::builder().max_generation_attempts(3).build(),
        );

        service.shorten(params("https://example1.com")).await.unwrap();
        let err = service
            .shorten(params("https://example2.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenError::GenerationExhausted(3)));
    }

    #[tokio::test]
    async fn concurrent_creates_with_same_alias_allow_one_winner() {
        use std::sync::Arc;

        let service = Arc::new(service(&clock()));
        let mut handles = vec![];

        for i in 0..2u64 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service
                    .shorten(ShortenParams {
                        original_url: format!("https://example{}.com", i),
                        validity_minutes: None,
                        custom_alias: Some("contested".to_string()),
                    })
                    .await
            }));
        }

        let mut successes = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(ShortenError::ShortcodeConflict(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {}", other),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 1);
    }

    #[tokio::test]
    async fn resolve_tracked_records_clicks() {
        let clock = clock();
        let service = service(&clock);

        let code = service.shorten(params("https://example.com")).await.unwrap();

        service.resolve_tracked(&code, Some("cli")).await.unwrap();
        clock.advance(SignedDuration::from_secs(10));
        service.resolve_tracked(&code, None).await.unwrap();

        let clicks = service.clicks(&code).await.unwrap();
        assert_eq!(clicks.len(), 2);
        assert_eq!(clicks[0].source.as_deref(), Some("cli"));
        assert_eq!(clicks[1].source, None);
        assert!(clicks[0].at < clicks[1].at);
    }

    #[tokio::test]
    async fn plain_resolve_does_not_record_clicks() {
        let service = service(&clock());

        let code = service.shorten(params("https://example.com")).await.unwrap();
        service.resolve(&code).await.unwrap();

        assert!(service.clicks(&code).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn resolve_tracked_on_unknown_code() {
        let service = service(&clock());

        let result = service
            .resolve_tracked(&ShortCode::new_unchecked("nope"), None)
            .await
            .unwrap();
        assert!(result.is_none());
    }
}

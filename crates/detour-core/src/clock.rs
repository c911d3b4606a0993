use jiff::{SignedDuration, Timestamp};
use std::sync::{Arc, Mutex};

/// A source of the current time.
///
/// Expiry is decided entirely against an injected clock, so tests can
/// cross an expiry instant without sleeping.
pub trait Clock: Send + Sync {
    /// Returns the current time of the clock.
    fn now(&self) -> Timestamp;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same underlying time, so a repository and a
/// service can be driven by one clock.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Moves the clock by the given duration.
    pub fn advance(&self, by: SignedDuration) {
        let mut now = self
            .now
            .lock()
            .expect("manual clock lock should not be poisoned");
        *now = *now + by;
    }

    /// Sets the clock to a specific instant.
    pub fn set(&self, to: Timestamp) {
        let mut now = self
            .now
            .lock()
            .expect("manual clock lock should not be poisoned");
        *now = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self
            .now
            .lock()
            .expect("manual clock lock should not be poisoned")
    }
}

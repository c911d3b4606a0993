use async_trait::async_trait;
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use detour_core::{
    ClickEvent, Clock, Repository, Result, ShortCode, ShortenError, SystemClock, UrlRecord,
};
use jiff::Timestamp;
use tracing::debug;

/// In-memory storage entry for a URL mapping.
#[derive(Debug, Clone)]
struct Entry {
    record: UrlRecord,
    clicks: Vec<ClickEvent>,
}

impl Entry {
    fn new(record: UrlRecord) -> Self {
        Self {
            record,
            clicks: Vec::new(),
        }
    }
}

/// In-memory implementation of the Repository trait using DashMap.
///
/// DashMap shards the key space, so every operation is a short O(1)
/// critical section on a single key. Expired entries are evicted
/// lazily by the lookup that finds them; there is no background
/// sweeper, and memory growth is bounded by write traffic.
#[derive(Debug, Clone)]
pub struct InMemoryRepository<C: Clock = SystemClock> {
    storage: DashMap<String, Entry>,
    clock: C,
}

impl InMemoryRepository<SystemClock> {
    /// Creates a new in-memory repository on the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> InMemoryRepository<C> {
    /// Creates a new in-memory repository reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            storage: DashMap::new(),
            clock,
        }
    }

    /// Removes the entry only if it is still expired. The re-check and
    /// the removal share one per-key critical section, so a racing
    /// insert that just replaced the entry with a live record is not
    /// lost.
    fn evict(&self, key: &str, now: Timestamp) {
        let removed = self
            .storage
            .remove_if(key, |_, entry| entry.record.is_expired(now));
        if removed.is_some() {
            debug!(code = key, "evicted expired short code");
        }
    }
}

impl Default for InMemoryRepository<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<C: Clock + 'static> Repository for InMemoryRepository<C> {
    async fn insert(&self, code: &ShortCode, record: UrlRecord) -> Result<()> {
        let now = self.clock.now();

        // The entry API keeps the liveness check and the insert in one
        // per-key critical section, so two racing inserts for the same
        // code cannot both succeed.
        match self.storage.entry(code.as_str().to_owned()) {
            MapEntry::Occupied(mut occupied) => {
                if !occupied.get().record.is_expired(now) {
                    return Err(ShortenError::ShortcodeConflict(code.to_string()));
                }
                occupied.insert(Entry::new(record));
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::new(record));
            }
        }

        Ok(())
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        let key = code.as_str();
        let now = self.clock.now();

        let Some(entry) = self.storage.get(key) else {
            return Ok(None);
        };

        if entry.record.is_expired(now) {
            drop(entry);
            self.evict(key, now);
            return Ok(None);
        }

        Ok(Some(entry.record.clone()))
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let key = code.as_str();
        let now = self.clock.now();

        let Some(entry) = self.storage.get(key) else {
            return Ok(false);
        };

        if entry.record.is_expired(now) {
            drop(entry);
            self.evict(key, now);
            return Ok(false);
        }

        Ok(true)
    }

    async fn record_click(&self, code: &ShortCode, click: ClickEvent) -> Result<()> {
        let key = code.as_str();
        let now = self.clock.now();

        let Some(mut entry) = self.storage.get_mut(key) else {
            return Ok(());
        };

        if entry.record.is_expired(now) {
            drop(entry);
            self.evict(key, now);
            return Ok(());
        }

        entry.clicks.push(click);
        Ok(())
    }

    async fn clicks(&self, code: &ShortCode) -> Result<Vec<ClickEvent>> {
        let key = code.as_str();
        let now = self.clock.now();

        let Some(entry) = self.storage.get(key) else {
            return Ok(Vec::new());
        };

        if entry.record.is_expired(now) {
            drop(entry);
            self.evict(key, now);
            return Ok(Vec::new());
        }

        Ok(entry.clicks.clone())
    }
}

//! Query cache for content fetches.
//!
//! Every content read goes through [`QueryCache::fetch`] keyed by a
//! [`QueryKey`] (table plus an optional slug for per-page rows). Two windows
//! control reuse:
//!
//! - **stale time** (default 5 minutes): inside it, a cached value is
//!   returned without touching the store.
//! - **gc time** (default 30 minutes): an entry nobody has asked for in this
//!   long is evicted. Eviction runs at the start of every fetch, so a
//!   long-idle cache shrinks on the next use.
//!
//! A stale entry is refetched on the next request. If that refetch fails the
//! caller gets [`FetchState::Error`] and the old entry is kept, so a later
//! request inside the retention window still has something to compare
//! against. Admin writes call [`QueryCache::invalidate`] for the table they
//! touched.
//!
//! Time is read through [`Clock`] so tests can move it by hand.

use crate::store::Table;
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Result of a content fetch as the page sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    /// No fetch has completed for this key yet.
    Loading,
    Error(String),
    Data(T),
}

impl<T> FetchState<T> {
    pub fn data(self) -> Option<T> {
        match self {
            FetchState::Data(value) => Some(value),
            FetchState::Loading | FetchState::Error(_) => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FetchState::Error(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub table: Table,
    pub slug: Option<String>,
}

impl QueryKey {
    pub fn table(table: Table) -> Self {
        Self { table, slug: None }
    }

    pub fn slug(table: Table, slug: &str) -> Self {
        Self {
            table,
            slug: Some(slug.to_string()),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slug {
            Some(slug) => write!(f, "{}/{}", self.table, slug),
            None => write!(f, "{}", self.table),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub stale_time: Duration,
    pub gc_time: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            gc_time: Duration::from_secs(30 * 60),
        }
    }
}

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct Entry {
    value: Box<dyn Any>,
    fetched_at: Instant,
    last_used: Instant,
}

/// Summary of cache behaviour for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
    pub evictions: u32,
}

impl CacheStats {
    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} fetched ({} total)",
                self.hits,
                self.misses,
                self.total()
            )?;
        } else {
            write!(f, "{} fetched", self.misses)?;
        }
        if self.evictions > 0 {
            write!(f, ", {} evicted", self.evictions)?;
        }
        Ok(())
    }
}

pub struct QueryCache {
    policy: CachePolicy,
    clock: Box<dyn Clock>,
    entries: RefCell<HashMap<QueryKey, Entry>>,
    stats: RefCell<CacheStats>,
}

impl QueryCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self::with_clock(policy, Box::new(SystemClock))
    }

    pub fn with_clock(policy: CachePolicy, clock: Box<dyn Clock>) -> Self {
        Self {
            policy,
            clock,
            entries: RefCell::new(HashMap::new()),
            stats: RefCell::new(CacheStats::default()),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Return the cached value for `key` while it is fresh, otherwise run
    /// `loader` and cache its result.
    pub fn fetch<T, E, F>(&self, key: &QueryKey, loader: F) -> FetchState<T>
    where
        T: Clone + 'static,
        E: fmt::Display,
        F: FnOnce() -> Result<T, E>,
    {
        let now = self.clock.now();
        self.evict_idle(now);

        if let Some(entry) = self.entries.borrow_mut().get_mut(key)
            && now.duration_since(entry.fetched_at) < self.policy.stale_time
            && let Some(value) = entry.value.downcast_ref::<T>()
        {
            entry.last_used = now;
            self.stats.borrow_mut().hits += 1;
            tracing::trace!(%key, "cache hit");
            return FetchState::Data(value.clone());
        }

        self.stats.borrow_mut().misses += 1;
        match loader() {
            Ok(value) => {
                tracing::debug!(%key, "fetched");
                self.entries.borrow_mut().insert(
                    key.clone(),
                    Entry {
                        value: Box::new(value.clone()),
                        fetched_at: now,
                        last_used: now,
                    },
                );
                FetchState::Data(value)
            }
            Err(e) => {
                tracing::warn!(%key, error = %e, "fetch failed");
                if let Some(entry) = self.entries.borrow_mut().get_mut(key) {
                    entry.last_used = now;
                }
                FetchState::Error(e.to_string())
            }
        }
    }

    /// Current cached value for `key` without fetching, regardless of
    /// freshness. `Loading` when nothing has been fetched yet.
    pub fn state<T: Clone + 'static>(&self, key: &QueryKey) -> FetchState<T> {
        match self
            .entries
            .borrow()
            .get(key)
            .and_then(|entry| entry.value.downcast_ref::<T>())
        {
            Some(value) => FetchState::Data(value.clone()),
            None => FetchState::Loading,
        }
    }

    /// Drop every entry for `table`, slugged or not.
    pub fn invalidate(&self, table: Table) {
        self.entries.borrow_mut().retain(|key, _| key.table != table);
        tracing::debug!(%table, "invalidated");
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        *self.stats.borrow()
    }

    fn evict_idle(&self, now: Instant) {
        let gc_time = self.policy.gc_time;
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.last_used) < gc_time);
        let evicted = before - entries.len();
        if evicted > 0 {
            self.stats.borrow_mut().evictions += evicted as u32;
            tracing::debug!(evicted, "evicted idle cache entries");
        }
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("policy", &self.policy)
            .field("entries", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ManualClock;
    use std::cell::Cell;

    const MINUTE: Duration = Duration::from_secs(60);

    fn cache() -> (QueryCache, ManualClock) {
        let clock = ManualClock::new();
        let cache = QueryCache::with_clock(CachePolicy::default(), Box::new(clock.clone()));
        (cache, clock)
    }

    fn counting_loader<'a>(calls: &'a Cell<u32>, value: &'a str) -> impl FnOnce() -> Result<String, String> + 'a {
        move || {
            calls.set(calls.get() + 1);
            Ok(value.to_string())
        }
    }

    // =========================================================================
    // Freshness
    // =========================================================================

    #[test]
    fn fresh_entry_skips_loader() {
        let (cache, clock) = cache();
        let key = QueryKey::table(Table::Services);
        let calls = Cell::new(0);

        assert_eq!(cache.fetch(&key, counting_loader(&calls, "a")), FetchState::Data("a".to_string()));
        clock.advance(4 * MINUTE);
        assert_eq!(cache.fetch(&key, counting_loader(&calls, "b")), FetchState::Data("a".to_string()));
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1, evictions: 0 });
    }

    #[test]
    fn stale_entry_is_refetched() {
        let (cache, clock) = cache();
        let key = QueryKey::table(Table::Services);
        let calls = Cell::new(0);

        cache.fetch(&key, counting_loader(&calls, "a"));
        clock.advance(5 * MINUTE);
        assert_eq!(cache.fetch(&key, counting_loader(&calls, "b")), FetchState::Data("b".to_string()));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn slugs_are_separate_keys() {
        let (cache, _clock) = cache();
        let calls = Cell::new(0);
        cache.fetch(&QueryKey::slug(Table::PageHeroes, "about"), counting_loader(&calls, "a"));
        cache.fetch(&QueryKey::slug(Table::PageHeroes, "blog"), counting_loader(&calls, "b"));
        assert_eq!(calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    // =========================================================================
    // Retention
    // =========================================================================

    #[test]
    fn idle_entries_are_evicted_after_gc_time() {
        let (cache, clock) = cache();
        let calls = Cell::new(0);
        cache.fetch(&QueryKey::table(Table::Banners), counting_loader(&calls, "a"));
        clock.advance(31 * MINUTE);
        cache.fetch(&QueryKey::table(Table::Projects), counting_loader(&calls, "b"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(
            cache.state::<String>(&QueryKey::table(Table::Banners)),
            FetchState::Loading
        );
    }

    #[test]
    fn recently_used_entries_survive() {
        let (cache, clock) = cache();
        let key = QueryKey::table(Table::Banners);
        let calls = Cell::new(0);
        for _ in 0..4 {
            cache.fetch(&key, counting_loader(&calls, "a"));
            clock.advance(20 * MINUTE);
        }
        assert_eq!(cache.stats().evictions, 0);
    }

    // =========================================================================
    // Errors and invalidation
    // =========================================================================

    #[test]
    fn failed_fetch_reports_error_and_keeps_old_entry() {
        let (cache, clock) = cache();
        let key = QueryKey::table(Table::Testimonials);
        cache.fetch(&key, || Ok::<_, String>(7u32));
        clock.advance(10 * MINUTE);

        let state = cache.fetch(&key, || Err::<u32, _>("offline"));
        assert_eq!(state, FetchState::Error("offline".to_string()));
        assert_eq!(cache.state::<u32>(&key), FetchState::Data(7));
    }

    #[test]
    fn invalidate_drops_all_keys_for_table() {
        let (cache, _clock) = cache();
        cache.fetch(&QueryKey::slug(Table::PageHeroes, "a"), || Ok::<_, String>(1u8));
        cache.fetch(&QueryKey::slug(Table::PageHeroes, "b"), || Ok::<_, String>(2u8));
        cache.fetch(&QueryKey::table(Table::Banners), || Ok::<_, String>(3u8));
        cache.invalidate(Table::PageHeroes);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn state_before_fetch_is_loading() {
        let (cache, _clock) = cache();
        assert_eq!(
            cache.state::<String>(&QueryKey::table(Table::CtaContent)),
            FetchState::Loading
        );
    }

    // =========================================================================
    // Stats display
    // =========================================================================

    #[test]
    fn stats_display() {
        let none = CacheStats { hits: 0, misses: 4, evictions: 0 };
        assert_eq!(none.to_string(), "4 fetched");
        let some = CacheStats { hits: 3, misses: 2, evictions: 1 };
        assert_eq!(some.to_string(), "3 cached, 2 fetched (5 total), 1 evicted");
    }
}

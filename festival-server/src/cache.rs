//! Caching for per-visitor match results and catalog statistics.
//!
//! Match results only change when the catalog changes, so the per-visitor
//! cache is invalidated wholesale on reload rather than entry by entry. The
//! statistics cache is a single slow-to-compute value with an explicit
//! refresh escape hatch.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use moka::sync::Cache as MokaCache;

use crate::domain::VisitorId;
use crate::matcher::MatchResult;

/// Configuration for the per-visitor match cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            max_capacity: 10_000,
        }
    }
}

/// Per-visitor match results, keyed by the visitor's external id.
pub struct MatchCache {
    results: MokaCache<VisitorId, Arc<MatchResult>>,
}

impl MatchCache {
    pub fn new(config: &CacheConfig) -> Self {
        let results = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();
        Self { results }
    }

    pub fn get(&self, visitor: &VisitorId) -> Option<Arc<MatchResult>> {
        self.results.get(visitor)
    }

    pub fn insert(&self, visitor: VisitorId, result: Arc<MatchResult>) {
        self.results.insert(visitor, result);
    }

    /// Look up a visitor's result, computing and caching it on a miss.
    pub fn get_or_compute(
        &self,
        visitor: &VisitorId,
        compute: impl FnOnce() -> MatchResult,
    ) -> Arc<MatchResult> {
        if let Some(cached) = self.results.get(visitor) {
            return cached;
        }
        let result = Arc::new(compute());
        self.results.insert(visitor.clone(), result.clone());
        result
    }

    /// Drop every entry. Called after a catalog reload, when every cached
    /// result is potentially stale.
    pub fn invalidate_all(&self) {
        self.results.invalidate_all();
    }

    /// Cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.results.entry_count()
    }
}

impl Default for MatchCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

/// Whether a value computed at `computed_at` is still usable at `now`.
pub fn is_fresh(now: Instant, computed_at: Instant, ttl: Duration) -> bool {
    now.duration_since(computed_at) < ttl
}

/// A single cached value with a TTL, for catalog-wide statistics.
pub struct StatsCache<T> {
    slot: Mutex<Option<(T, Instant)>>,
    ttl: Duration,
}

impl<T: Clone> StatsCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Mutex::new(None),
            ttl,
        }
    }

    /// Return the cached value if fresh, otherwise compute, store and return
    /// a new one. `force_refresh` bypasses the freshness check.
    pub fn get_or_compute(&self, force_refresh: bool, compute: impl FnOnce() -> T) -> T {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        if !force_refresh
            && let Some((value, computed_at)) = slot.as_ref()
            && is_fresh(now, *computed_at, self.ttl)
        {
            return value.clone();
        }
        let value = compute();
        *slot = Some((value.clone(), now));
        value
    }

    /// Drop the cached value so the next read recomputes.
    pub fn invalidate(&self) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatchKind;

    fn result(percentage: f64) -> MatchResult {
        MatchResult {
            found: true,
            match_type: MatchKind::Partial,
            match_percentage: percentage,
            best_route_id: None,
            routes_checked: 1,
            reason: None,
        }
    }

    #[test]
    fn get_or_compute_runs_the_closure_once() {
        let cache = MatchCache::default();
        let visitor = VisitorId::new("v-1");

        let first = cache.get_or_compute(&visitor, || result(50.0));
        let second = cache.get_or_compute(&visitor, || unreachable!("cached"));

        assert_eq!(first, second);
    }

    #[test]
    fn invalidate_all_forces_recompute() {
        let cache = MatchCache::default();
        let visitor = VisitorId::new("v-1");

        cache.get_or_compute(&visitor, || result(50.0));
        cache.invalidate_all();
        let fresh = cache.get_or_compute(&visitor, || result(75.0));

        assert_eq!(fresh.match_percentage, 75.0);
    }

    #[test]
    fn freshness_is_strict() {
        let ttl = Duration::from_secs(60);
        let computed_at = Instant::now();
        assert!(is_fresh(computed_at + Duration::from_secs(59), computed_at, ttl));
        assert!(!is_fresh(computed_at + Duration::from_secs(60), computed_at, ttl));
        assert!(!is_fresh(computed_at + Duration::from_secs(61), computed_at, ttl));
    }

    #[test]
    fn stats_cache_serves_the_cached_value_within_ttl() {
        let cache = StatsCache::new(Duration::from_secs(300));

        assert_eq!(cache.get_or_compute(false, || 1), 1);
        assert_eq!(cache.get_or_compute(false, || 2), 1);
    }

    #[test]
    fn force_refresh_recomputes_immediately() {
        let cache = StatsCache::new(Duration::from_secs(300));

        assert_eq!(cache.get_or_compute(false, || 1), 1);
        assert_eq!(cache.get_or_compute(true, || 2), 2);
        assert_eq!(cache.get_or_compute(false, || 3), 2);
    }

    #[test]
    fn invalidate_drops_the_value() {
        let cache = StatsCache::new(Duration::from_secs(300));

        cache.get_or_compute(false, || 1);
        cache.invalidate();
        assert_eq!(cache.get_or_compute(false, || 2), 2);
    }
}

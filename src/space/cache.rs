//! Bounded memo of recent spatial queries with least-recently-used eviction.
//!
//! Keys are the exact query parameters. Nothing here notices when the
//! underlying lights change; the owning [`LedSpace`](super::LedSpace) must call
//! [`QueryCache::invalidate`] whenever it remaps.

use std::num::NonZeroUsize;

use lru::LruCache;

use crate::geometry::Light;

/// Distinct recent entries kept per query kind.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Hit and miss counters since the last invalidation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    fn record(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
            log::trace!("query cache hit");
        } else {
            self.misses += 1;
        }
    }
}

type BoxKey = [u64; 4];
type RadiusKey = [u64; 3];
type NearestKey = [u64; 3];

/// Query results keyed by kind and parameters.
pub struct QueryCache {
    boxes: LruCache<BoxKey, Vec<Light>>,
    radii: LruCache<RadiusKey, Vec<Light>>,
    nearest: LruCache<NearestKey, Option<usize>>,
    stats: CacheStats,
}

impl QueryCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        QueryCache {
            boxes: LruCache::new(capacity),
            radii: LruCache::new(capacity),
            nearest: LruCache::new(capacity),
            stats: CacheStats::default(),
        }
    }

    pub fn boxed(&mut self, params: [f64; 4], compute: impl FnOnce() -> Vec<Light>) -> Vec<Light> {
        memo(&mut self.boxes, &mut self.stats, key(params), compute)
    }

    pub fn radius(&mut self, params: [f64; 3], compute: impl FnOnce() -> Vec<Light>) -> Vec<Light> {
        memo(&mut self.radii, &mut self.stats, key(params), compute)
    }

    /// Cached nearest-light answer; the outer `None` is a cache miss.
    pub fn lookup_nearest(&mut self, params: [f64; 3]) -> Option<Option<usize>> {
        let hit = self.nearest.get(&key(params)).copied();
        self.stats.record(hit.is_some());
        hit
    }

    pub fn store_nearest(&mut self, params: [f64; 3], nearest: Option<usize>) {
        self.nearest.put(key(params), nearest);
    }

    /// Drop every entry in all three caches and reset the counters.
    pub fn invalidate(&mut self) {
        self.boxes.clear();
        self.radii.clear();
        self.nearest.clear();
        self.stats = CacheStats::default();
    }

    pub fn len(&self) -> usize {
        self.boxes.len() + self.radii.len() + self.nearest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Entries kept per query kind.
    pub fn capacity(&self) -> usize {
        self.boxes.cap().get()
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        QueryCache::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("stats", &self.stats)
            .finish()
    }
}

fn memo<K, V>(
    cache: &mut LruCache<K, V>,
    stats: &mut CacheStats,
    key: K,
    compute: impl FnOnce() -> V,
) -> V
where
    K: std::hash::Hash + Eq,
    V: Clone,
{
    if let Some(hit) = cache.get(&key) {
        stats.record(true);
        return hit.clone();
    }

    stats.record(false);
    let value = compute();
    cache.put(key, value.clone());
    value
}

/// Bit pattern of each parameter; `-0.0` folds onto `0.0`.
fn key<const N: usize>(params: [f64; N]) -> [u64; N] {
    params.map(|v| (v + 0.0).to_bits())
}

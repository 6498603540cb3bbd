//! Bounded memoisation of quantised coordinate pairs.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use log::warn;
use lru::LruCache;

use super::{COORDINATE_PRECISION, DistanceSource, LatLng, canonical_pair, haversine_miles};

/// Quantised coordinates stored as scaled integers so the key is `Eq + Hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PairKey([i64; 4]);

impl PairKey {
    fn new(from: LatLng, to: LatLng) -> Self {
        Self([
            scaled(from.lat),
            scaled(from.lng),
            scaled(to.lat),
            scaled(to.lng),
        ])
    }
}

#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    reason = "degrees are at most 180, so scaled values fit comfortably in i64"
)]
fn scaled(degrees: f64) -> i64 {
    (degrees * 10_f64.powi(COORDINATE_PRECISION)).round() as i64
}

/// Point-in-time counters for a [`DistanceCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DistanceCacheStats {
    /// Entries currently held.
    pub len: usize,
    /// Maximum entries before eviction.
    pub capacity: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that computed a fresh distance.
    pub misses: u64,
}

/// Thread-safe FIFO cache of distances keyed by quantised coordinate pairs.
///
/// Once full, the oldest inserted entry is evicted regardless of how recently
/// it was read. The cache stores exactly what [`DirectDistance`] would
/// compute for the same quantised pair, so enabling or disabling it never
/// changes a matching outcome.
///
/// A poisoned lock is not fatal: the lookup falls back to direct computation.
///
/// [`DirectDistance`]: super::DirectDistance
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use accessride_core::{DistanceCache, DistanceSource, LatLng};
///
/// let cache = DistanceCache::new(NonZeroUsize::new(128).expect("non-zero"));
/// let a = LatLng { lat: 51.5, lng: -0.12 };
/// let b = LatLng { lat: 51.6, lng: -0.2 };
/// let first = cache.miles(a, b);
/// assert_eq!(cache.miles(a, b), first);
/// assert_eq!(cache.stats().hits, 1);
/// ```
#[derive(Debug)]
pub struct DistanceCache {
    entries: Mutex<LruCache<PairKey, f64>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DistanceCache {
    /// Create a cache holding at most `capacity` pairs.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Drop every cached distance. Counters are left untouched.
    pub fn clear(&self) {
        match self.entries.lock() {
            Ok(mut entries) => entries.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    /// Report the current size, capacity, and hit counters.
    #[must_use]
    pub fn stats(&self) -> DistanceCacheStats {
        let (len, capacity) = match self.entries.lock() {
            Ok(entries) => (entries.len(), entries.cap().get()),
            Err(poisoned) => {
                let entries = poisoned.into_inner();
                (entries.len(), entries.cap().get())
            }
        };
        DistanceCacheStats {
            len,
            capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    fn lookup(&self, key: PairKey) -> Option<f64> {
        // `peek` leaves recency untouched, which turns the LRU into FIFO.
        let entries = self.entries.lock().ok()?;
        entries.peek(&key).copied()
    }

    fn insert(&self, key: PairKey, miles: f64) {
        match self.entries.lock() {
            Ok(mut entries) => {
                if !entries.contains(&key) {
                    entries.push(key, miles);
                }
            }
            Err(_) => warn!("distance cache lock poisoned; skipping insert"),
        }
    }
}

impl DistanceSource for DistanceCache {
    fn miles(&self, from: LatLng, to: LatLng) -> f64 {
        let (a, b) = canonical_pair(from.quantised(), to.quantised());
        let key = PairKey::new(a, b);
        if let Some(miles) = self.lookup(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return miles;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let miles = haversine_miles(a, b);
        self.insert(key, miles);
        miles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DirectDistance;
    use rstest::{fixture, rstest};

    #[fixture]
    fn small_cache() -> DistanceCache {
        DistanceCache::new(NonZeroUsize::new(2).expect("non-zero capacity"))
    }

    fn point(lat: f64) -> LatLng {
        LatLng { lat, lng: -1.0 }
    }

    #[rstest]
    fn repeated_lookup_hits(small_cache: DistanceCache) {
        let first = small_cache.miles(point(51.0), point(51.1));
        let second = small_cache.miles(point(51.0), point(51.1));
        assert_eq!(first, second);
        let stats = small_cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.len, 1);
    }

    #[rstest]
    fn reversed_pair_shares_an_entry(small_cache: DistanceCache) {
        small_cache.miles(point(51.0), point(51.1));
        small_cache.miles(point(51.1), point(51.0));
        assert_eq!(small_cache.stats().hits, 1);
    }

    #[rstest]
    fn near_identical_coordinates_share_an_entry(small_cache: DistanceCache) {
        small_cache.miles(point(51.000_01), point(51.1));
        small_cache.miles(point(51.000_02), point(51.1));
        assert_eq!(small_cache.stats().hits, 1);
    }

    #[rstest]
    fn evicts_oldest_insert_even_when_recently_read(small_cache: DistanceCache) {
        small_cache.miles(point(50.0), point(50.5));
        small_cache.miles(point(51.0), point(51.5));
        // Reading the oldest entry must not protect it from eviction.
        small_cache.miles(point(50.0), point(50.5));
        small_cache.miles(point(52.0), point(52.5));

        let before = small_cache.stats();
        small_cache.miles(point(50.0), point(50.5));
        let after = small_cache.stats();
        assert_eq!(after.misses, before.misses + 1, "oldest entry should be gone");
        assert_eq!(after.len, 2);
    }

    #[rstest]
    fn matches_direct_computation(small_cache: DistanceCache) {
        let from = LatLng { lat: 51.507_43, lng: -0.127_81 };
        let to = LatLng { lat: 51.515_49, lng: -0.141_94 };
        let direct = DirectDistance.miles(from, to);
        assert_eq!(small_cache.miles(from, to), direct);
        assert_eq!(small_cache.miles(from, to), direct);
    }

    #[rstest]
    fn clear_empties_the_cache(small_cache: DistanceCache) {
        small_cache.miles(point(50.0), point(50.5));
        small_cache.clear();
        assert_eq!(small_cache.stats().len, 0);
    }
}

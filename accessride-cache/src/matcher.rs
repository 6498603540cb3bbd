//! [`MatchEngine`] wrapper that serves repeated queries from the result cache.

use std::sync::Arc;

use accessride_core::{Booking, BookingId, Driver, DriverId, MatchEngine, MatchResult, Matcher};
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::backend::{CacheBackend, MemoryBackend};
use crate::config::ResultCacheConfig;
use crate::store::{Anchor, CacheStats, Candidate, Lookup, ResultCache};
use crate::writer::{WriteBehind, WriteBehindError};

/// Caching front for any [`MatchEngine`].
///
/// A hit returns the stored list without running the wrapped engine. A miss
/// runs it, returns the fresh list and queues the write in the background.
/// Backend failures never reach the caller: they are logged and the engine
/// runs directly.
///
/// Entries are keyed by anchor id alone, so callers are expected to pass the
/// same candidate set for an anchor within one TTL window. Every candidate a
/// list was ranked from is remembered: a relevant edit to that driver or
/// booking invalidates the list as well as the candidate's own.
///
/// # Examples
/// ```
/// use accessride_cache::CachedMatcher;
/// use accessride_core::{Booking, Driver, MatchEngine, VehicleClass};
///
/// let matcher = CachedMatcher::in_memory();
/// let driver = Driver::new(1, VehicleClass::StandardCar).approved();
/// let bookings = [Booking::new(2).with_ambulatory_passengers(1)];
///
/// let first = matcher.match_driver_to_bookings(&driver, &bookings);
/// matcher.flush();
/// let second = matcher.match_driver_to_bookings(&driver, &bookings);
/// assert_eq!(first, second);
/// assert_eq!(matcher.stats().map(|s| s.hits), Some(1));
/// ```
#[derive(Debug)]
pub struct CachedMatcher<E = Matcher, B = MemoryBackend> {
    engine: E,
    cache: Option<ResultCache<B>>,
}

impl CachedMatcher<Matcher, MemoryBackend> {
    /// Default matcher over a process-local backend with default settings.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Matcher::with_defaults(),
            Arc::new(MemoryBackend::new()),
            ResultCacheConfig::default(),
        )
    }
}

impl<E: MatchEngine, B: CacheBackend + 'static> CachedMatcher<E, B> {
    /// Wrap `engine`, caching through `backend`.
    ///
    /// If the background writer cannot start, the matcher logs a warning and
    /// runs uncached.
    #[must_use]
    pub fn new(engine: E, backend: Arc<B>, config: ResultCacheConfig) -> Self {
        match WriteBehind::new() {
            Ok(writer) => Self {
                engine,
                cache: Some(ResultCache::new(backend, config, writer)),
            },
            Err(err) => {
                warn!("result cache disabled: {err}");
                Self::uncached(engine)
            }
        }
    }

    /// Wrap `engine`, failing if the background writer cannot start.
    ///
    /// # Errors
    /// Returns [`WriteBehindError`] when the writer runtime cannot be built.
    pub fn try_new(
        engine: E,
        backend: Arc<B>,
        config: ResultCacheConfig,
    ) -> Result<Self, WriteBehindError> {
        let writer = WriteBehind::new()?;
        Ok(Self {
            engine,
            cache: Some(ResultCache::new(backend, config, writer)),
        })
    }

    /// Pass every call straight through to `engine`.
    #[must_use]
    pub const fn uncached(engine: E) -> Self {
        Self {
            engine,
            cache: None,
        }
    }

    /// The wrapped engine.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Report whether results are being cached.
    #[must_use]
    pub const fn is_caching(&self) -> bool {
        self.cache.is_some()
    }

    /// Cache counters, or `None` when running uncached.
    #[must_use]
    pub fn stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(ResultCache::stats)
    }

    /// Drop the cached list for a driver.
    pub fn invalidate_driver(&self, id: DriverId) {
        self.invalidate(Anchor::Driver(id));
    }

    /// Drop the cached list for a booking.
    pub fn invalidate_booking(&self, id: BookingId) {
        self.invalidate(Anchor::Booking(id));
    }

    /// Drop every cached list, e.g. after a capability-table change.
    pub fn invalidate_all(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }

    /// Invalidate after a driver profile edit, if the edit can change a match.
    ///
    /// Booking lists that ranked this driver are invalidated with it.
    /// Returns `true` when an invalidation was issued.
    pub fn driver_updated(&self, before: &Driver, after: &Driver) -> bool {
        if !before.matching_fields_differ(after) {
            return false;
        }
        self.invalidate_driver(before.id);
        if after.id != before.id {
            self.invalidate_driver(after.id);
        }
        true
    }

    /// Invalidate after a booking edit, if the edit can change a match.
    ///
    /// Driver lists that ranked this booking are invalidated with it.
    /// Returns `true` when an invalidation was issued.
    pub fn booking_updated(&self, before: &Booking, after: &Booking) -> bool {
        if before.id == after.id && !before.matching_fields_differ(after) {
            return false;
        }
        self.invalidate_booking(before.id);
        if after.id != before.id {
            self.invalidate_booking(after.id);
        }
        true
    }

    /// Block until queued cache writes have reached the backend.
    pub fn flush(&self) {
        if let Some(cache) = &self.cache {
            cache.flush();
        }
    }

    fn invalidate(&self, anchor: Anchor) {
        if let Some(cache) = &self.cache {
            cache.invalidate(anchor);
        }
    }

    fn through_cache<C, F>(
        &self,
        anchor: Anchor,
        candidates: &[C],
        compute: F,
    ) -> Vec<MatchResult<C>>
    where
        C: Candidate + Serialize + DeserializeOwned,
        F: FnOnce() -> Vec<MatchResult<C>>,
    {
        let Some(cache) = &self.cache else {
            return compute();
        };
        match cache.lookup(anchor) {
            Lookup::Hit(results) => results,
            Lookup::Miss(stamp) => {
                cache.track(anchor, candidates);
                let results = compute();
                cache.store(anchor, stamp, &results);
                results
            }
        }
    }
}

impl<E: MatchEngine, B: CacheBackend + 'static> MatchEngine for CachedMatcher<E, B> {
    fn match_driver_to_bookings(
        &self,
        driver: &Driver,
        bookings: &[Booking],
    ) -> Vec<MatchResult<Booking>> {
        self.through_cache(Anchor::Driver(driver.id), bookings, || {
            self.engine.match_driver_to_bookings(driver, bookings)
        })
    }

    fn match_booking_to_drivers(
        &self,
        booking: &Booking,
        drivers: &[Driver],
    ) -> Vec<MatchResult<Driver>> {
        self.through_cache(Anchor::Booking(booking.id), drivers, || {
            self.engine.match_booking_to_drivers(booking, drivers)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::UnavailableBackend;
    use accessride_core::VehicleClass;
    use accessride_core::test_support::{CountingEngine, ambulatory_booking, london_driver};
    use rstest::{fixture, rstest};

    type Counted = CachedMatcher<CountingEngine, MemoryBackend>;

    #[fixture]
    fn matcher() -> Counted {
        CachedMatcher::try_new(
            CountingEngine::default(),
            Arc::new(MemoryBackend::new()),
            ResultCacheConfig::default(),
        )
        .expect("writer should start")
    }

    #[rstest]
    fn booking_anchor_is_cached_separately(matcher: Counted) {
        let booking = ambulatory_booking(5, 1);
        let drivers = [london_driver(1, VehicleClass::StandardCar)];
        let first = matcher.match_booking_to_drivers(&booking, &drivers);
        matcher.flush();
        let second = matcher.match_booking_to_drivers(&booking, &drivers);
        assert_eq!(first, second);
        assert_eq!(matcher.engine().booking_calls(), 1);
        assert_eq!(matcher.engine().driver_calls(), 0);
    }

    #[rstest]
    fn cosmetic_booking_edit_keeps_cache(matcher: Counted) {
        let booking = ambulatory_booking(5, 1);
        assert!(!matcher.booking_updated(&booking, &booking.clone()));
        assert!(matcher.booking_updated(&booking, &booking.clone().with_wheelchair_users(1)));
    }

    #[rstest]
    fn driver_edit_invalidates_only_when_relevant(matcher: Counted) {
        let driver = london_driver(1, VehicleClass::StandardCar);
        let bookings = [ambulatory_booking(5, 1)];
        matcher.match_driver_to_bookings(&driver, &bookings);
        matcher.flush();

        assert!(!matcher.driver_updated(&driver, &driver.clone()));
        matcher.match_driver_to_bookings(&driver, &bookings);
        assert_eq!(matcher.engine().driver_calls(), 1);

        assert!(matcher.driver_updated(&driver, &driver.clone().suspended()));
        matcher.match_driver_to_bookings(&driver, &bookings);
        assert_eq!(matcher.engine().driver_calls(), 2);
    }

    fn ranked_driver_ids(
        matcher: &CachedMatcher,
        booking: &Booking,
        drivers: &[Driver],
    ) -> Vec<u64> {
        let ranked = matcher.match_booking_to_drivers(booking, drivers);
        matcher.flush();
        ranked.iter().map(|result| result.candidate.id).collect()
    }

    #[rstest]
    fn suspending_a_driver_drops_them_from_cached_booking_lists() {
        let matcher = CachedMatcher::in_memory();
        let booking = ambulatory_booking(5, 1);
        let driver = london_driver(1, VehicleClass::StandardCar);
        let other = london_driver(2, VehicleClass::LargeCar);
        assert_eq!(
            ranked_driver_ids(&matcher, &booking, &[driver.clone(), other.clone()]),
            vec![1, 2]
        );

        let suspended = driver.clone().suspended();
        assert!(matcher.driver_updated(&driver, &suspended));
        matcher.flush();

        let after = ranked_driver_ids(&matcher, &booking, &[suspended, other]);
        assert_eq!(after, vec![2]);
    }

    #[rstest]
    fn approving_a_rejected_driver_reaches_cached_booking_lists() {
        let matcher = CachedMatcher::in_memory();
        let booking = ambulatory_booking(5, 1);
        let mut pending = london_driver(3, VehicleClass::StandardCar);
        pending.approved = false;
        assert!(ranked_driver_ids(&matcher, &booking, &[pending.clone()]).is_empty());

        let approved = pending.clone().approved();
        assert!(matcher.driver_updated(&pending, &approved));
        matcher.flush();

        assert_eq!(ranked_driver_ids(&matcher, &booking, &[approved]), vec![3]);
    }

    #[rstest]
    fn booking_edit_refreshes_cached_driver_lists() {
        let matcher = CachedMatcher::in_memory();
        let driver = london_driver(1, VehicleClass::StandardCar);
        let booking = ambulatory_booking(5, 1);
        let before = matcher.match_driver_to_bookings(&driver, &[booking.clone()]);
        matcher.flush();
        assert_eq!(before.len(), 1);

        let needs_wav = booking.clone().with_wheelchair_users(1);
        assert!(matcher.booking_updated(&booking, &needs_wav));
        matcher.flush();

        assert!(matcher.match_driver_to_bookings(&driver, &[needs_wav]).is_empty());
    }

    #[rstest]
    fn unrelated_edits_leave_other_lists_cached(matcher: Counted) {
        let booking = ambulatory_booking(5, 1);
        let drivers = [london_driver(1, VehicleClass::StandardCar)];
        matcher.match_booking_to_drivers(&booking, &drivers);
        matcher.flush();

        let stranger = london_driver(9, VehicleClass::StandardCar);
        assert!(matcher.driver_updated(&stranger, &stranger.clone().suspended()));
        matcher.flush();
        matcher.match_booking_to_drivers(&booking, &drivers);
        assert_eq!(matcher.engine().booking_calls(), 1);
    }

    #[rstest]
    fn concurrent_queries_on_one_anchor_agree() {
        const THREADS: u64 = 8;
        const ROUNDS: u64 = 25;

        let matcher = CachedMatcher::in_memory();
        let driver = london_driver(1, VehicleClass::LargeCar);
        let bookings: Vec<Booking> = (1..=6).map(|id| ambulatory_booking(id, 2)).collect();
        let expected = Matcher::with_defaults().match_driver_to_bookings(&driver, &bookings);

        std::thread::scope(|scope| {
            for _ in 0..THREADS {
                scope.spawn(|| {
                    for _ in 0..ROUNDS {
                        let ranked = matcher.match_driver_to_bookings(&driver, &bookings);
                        assert_eq!(ranked, expected);
                    }
                });
            }
        });
        matcher.flush();

        let stats = matcher.stats().expect("caching is enabled");
        assert_eq!(stats.hits + stats.misses, THREADS * ROUNDS);
        assert_eq!(stats.backend_errors, 0);
        assert_eq!(matcher.match_driver_to_bookings(&driver, &bookings), expected);
    }

    #[rstest]
    fn uncached_matcher_always_computes() {
        let matcher: CachedMatcher<CountingEngine> = CachedMatcher::uncached(CountingEngine::default());
        let driver = london_driver(1, VehicleClass::StandardCar);
        matcher.match_driver_to_bookings(&driver, &[]);
        matcher.match_driver_to_bookings(&driver, &[]);
        assert_eq!(matcher.engine().driver_calls(), 2);
        assert!(matcher.stats().is_none());
        assert!(!matcher.is_caching());
    }

    #[rstest]
    fn outage_falls_back_to_direct_results() {
        let matcher = CachedMatcher::try_new(
            CountingEngine::default(),
            Arc::new(UnavailableBackend),
            ResultCacheConfig::default(),
        )
        .expect("writer should start");
        let driver = london_driver(1, VehicleClass::StandardCar);
        let bookings = [ambulatory_booking(5, 2)];
        let expected = Matcher::with_defaults().match_driver_to_bookings(&driver, &bookings);

        assert_eq!(matcher.match_driver_to_bookings(&driver, &bookings), expected);
        matcher.flush();
        assert_eq!(matcher.match_driver_to_bookings(&driver, &bookings), expected);
        assert_eq!(matcher.engine().driver_calls(), 2);
        let stats = matcher.stats().expect("caching is enabled");
        assert_eq!(stats.hits, 0);
        assert!(stats.backend_errors >= 2);
    }
}

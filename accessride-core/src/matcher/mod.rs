//! Matching orchestrator.
//!
//! Both directions share one pipeline: every candidate is paired with the
//! anchor, filtered, scored, and the survivors are stably sorted by
//! descending total score so ties keep their input order.

mod result;

pub use result::{Assessment, Evaluation, MatchResult};

use std::sync::Arc;

use crate::booking::Booking;
use crate::config::{MatchConfig, MatchConfigError};
use crate::distance::{DirectDistance, DistanceCache, DistanceCacheStats, DistanceSource};
use crate::driver::Driver;
use crate::filter::{FilterPipeline, Rejection};
use crate::scoring::ScoreBreakdown;
use crate::vehicle::CapabilityTable;

/// Ranks candidates against an anchor driver or booking.
///
/// Implementations must be safe to call concurrently. A rejected candidate is
/// simply absent from the output; neither call reports an error.
pub trait MatchEngine: Send + Sync {
    /// Rank `bookings` for `driver`.
    fn match_driver_to_bookings(
        &self,
        driver: &Driver,
        bookings: &[Booking],
    ) -> Vec<MatchResult<Booking>>;

    /// Rank `drivers` for `booking`.
    fn match_booking_to_drivers(
        &self,
        booking: &Booking,
        drivers: &[Driver],
    ) -> Vec<MatchResult<Driver>>;
}

impl<T: MatchEngine + ?Sized> MatchEngine for Arc<T> {
    fn match_driver_to_bookings(
        &self,
        driver: &Driver,
        bookings: &[Booking],
    ) -> Vec<MatchResult<Booking>> {
        (**self).match_driver_to_bookings(driver, bookings)
    }

    fn match_booking_to_drivers(
        &self,
        booking: &Booking,
        drivers: &[Driver],
    ) -> Vec<MatchResult<Driver>> {
        (**self).match_booking_to_drivers(booking, drivers)
    }
}

/// The uncached matching engine.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use accessride_core::{
///     Booking, CapabilityTable, Driver, LoadingSidePolicy, MatchConfig, MatchEngine, Matcher,
///     VehicleClass,
/// };
///
/// let config = MatchConfig { loading_side: LoadingSidePolicy::Preferred, ..MatchConfig::default() };
/// let matcher = Matcher::new(Arc::new(CapabilityTable::standard()), config).expect("valid config");
///
/// let booking = Booking::new(1).with_wheelchair_users(1);
/// let drivers = [
///     Driver::new(10, VehicleClass::StandardCar).approved(),
///     Driver::new(11, VehicleClass::SideLoadingWav).approved(),
/// ];
/// let ranked = matcher.match_booking_to_drivers(&booking, &drivers);
/// let ids: Vec<_> = ranked.iter().map(|r| r.candidate.id).collect();
/// assert_eq!(ids, [11]);
/// ```
#[derive(Debug)]
pub struct Matcher {
    table: Arc<CapabilityTable>,
    config: MatchConfig,
    distance_cache: Option<DistanceCache>,
}

impl Matcher {
    /// Build a matcher over `table`.
    ///
    /// # Errors
    /// Returns [`MatchConfigError`] when `config` fails validation.
    pub fn new(table: Arc<CapabilityTable>, config: MatchConfig) -> Result<Self, MatchConfigError> {
        config.validate()?;
        let distance_cache = config.cache_capacity()?.map(DistanceCache::new);
        Ok(Self {
            table,
            config,
            distance_cache,
        })
    }

    /// Matcher over the standard capability table with default settings.
    #[must_use]
    pub fn with_defaults() -> Self {
        let config = MatchConfig::default();
        let distance_cache = config
            .cache_capacity()
            .ok()
            .flatten()
            .map(DistanceCache::new);
        Self {
            table: Arc::new(CapabilityTable::standard()),
            config,
            distance_cache,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Capability table used by the vehicle-fit filter.
    #[must_use]
    pub fn capability_table(&self) -> &CapabilityTable {
        &self.table
    }

    /// Counters for the distance cache, or `None` when it is disabled.
    #[must_use]
    pub fn distance_cache_stats(&self) -> Option<DistanceCacheStats> {
        self.distance_cache.as_ref().map(DistanceCache::stats)
    }

    /// Drop every memoised distance.
    pub fn clear_distance_cache(&self) {
        if let Some(cache) = &self.distance_cache {
            cache.clear();
        }
    }

    /// Filter and score one pairing.
    ///
    /// # Errors
    /// Returns the first failing filter as a [`Rejection`]. This is an
    /// expected outcome, not a fault.
    pub fn evaluate(&self, driver: &Driver, booking: &Booking) -> Result<Assessment, Rejection> {
        let pipeline = FilterPipeline {
            table: &self.table,
            config: &self.config,
            distances: self.distances(),
        };
        let eligibility = pipeline.run(driver, booking)?;
        let score_breakdown = ScoreBreakdown::compute(
            eligibility.distance_miles,
            driver.rating,
            driver.completed_rides,
            &eligibility.capability,
            &booking.accessibility_profile,
        );
        Ok(Assessment {
            total_score: score_breakdown.total(),
            score_breakdown,
            distance_miles: eligibility.distance_miles,
            filter_outcomes: eligibility.outcomes,
        })
    }

    /// One verdict per booking, in input order, rejections included.
    #[must_use]
    pub fn explain_driver(&self, driver: &Driver, bookings: &[Booking]) -> Vec<Evaluation<Booking>> {
        explain(bookings, |booking| self.evaluate(driver, booking))
    }

    /// One verdict per driver, in input order, rejections included.
    #[must_use]
    pub fn explain_booking(&self, booking: &Booking, drivers: &[Driver]) -> Vec<Evaluation<Driver>> {
        explain(drivers, |driver| self.evaluate(driver, booking))
    }

    fn distances(&self) -> &dyn DistanceSource {
        self.distance_cache
            .as_ref()
            .map_or(&DirectDistance as &dyn DistanceSource, |cache| {
                cache as &dyn DistanceSource
            })
    }
}

impl MatchEngine for Matcher {
    fn match_driver_to_bookings(
        &self,
        driver: &Driver,
        bookings: &[Booking],
    ) -> Vec<MatchResult<Booking>> {
        rank(bookings, |booking| self.evaluate(driver, booking))
    }

    fn match_booking_to_drivers(
        &self,
        booking: &Booking,
        drivers: &[Driver],
    ) -> Vec<MatchResult<Driver>> {
        rank(drivers, |driver| self.evaluate(driver, booking))
    }
}

fn rank<C, F>(candidates: &[C], assess: F) -> Vec<MatchResult<C>>
where
    C: Clone,
    F: Fn(&C) -> Result<Assessment, Rejection>,
{
    let mut results: Vec<_> = candidates
        .iter()
        .filter_map(|candidate| {
            assess(candidate)
                .ok()
                .map(|assessment| MatchResult::new(candidate.clone(), assessment))
        })
        .collect();
    // `sort_by` is stable, so equal scores keep their input order.
    results.sort_by(|a, b| b.total_score.cmp(&a.total_score));
    results
}

fn explain<C, F>(candidates: &[C], assess: F) -> Vec<Evaluation<C>>
where
    C: Clone,
    F: Fn(&C) -> Result<Assessment, Rejection>,
{
    candidates
        .iter()
        .map(|candidate| match assess(candidate) {
            Ok(assessment) => Evaluation::Eligible(MatchResult::new(candidate.clone(), assessment)),
            Err(rejection) => Evaluation::Rejected {
                candidate: candidate.clone(),
                rejection,
            },
        })
        .collect()
}

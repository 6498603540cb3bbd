//! Fixture builders and a call-counting engine for tests in dependent crates.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{Booking, Driver, LatLng, MatchEngine, MatchResult, Matcher, VehicleClass};

/// Charing Cross, London.
pub const CENTRAL_LONDON: LatLng = LatLng {
    lat: 51.5074,
    lng: -0.1278,
};

/// Approved driver based in central London with a mid-range record.
#[must_use]
pub fn london_driver(id: u64, vehicle_class: VehicleClass) -> Driver {
    Driver::new(id, vehicle_class)
        .approved()
        .with_base_location(CENTRAL_LONDON)
        .with_rating(4.5)
        .with_completed_rides(60)
}

/// Booking for `passengers` ambulatory passengers collected near
/// [`CENTRAL_LONDON`].
#[must_use]
pub fn ambulatory_booking(id: u64, passengers: u32) -> Booking {
    Booking::new(id)
        .with_pickup_location(nearby_pickup())
        .with_ambulatory_passengers(passengers)
}

/// Booking for `users` wheelchair users collected near [`CENTRAL_LONDON`].
#[must_use]
pub fn wheelchair_booking(id: u64, users: u32) -> Booking {
    Booking::new(id)
        .with_pickup_location(nearby_pickup())
        .with_wheelchair_users(users)
}

/// Leicester Square, under a mile from [`CENTRAL_LONDON`].
const fn nearby_pickup() -> LatLng {
    LatLng {
        lat: 51.5103,
        lng: -0.1301,
    }
}

/// [`MatchEngine`] wrapper counting how often each direction actually runs.
///
/// Used to observe whether a caching layer skipped the pipeline.
///
/// # Examples
/// ```
/// use accessride_core::{Booking, Driver, MatchEngine, VehicleClass};
/// use accessride_core::test_support::CountingEngine;
///
/// let engine = CountingEngine::default();
/// engine.match_driver_to_bookings(&Driver::new(1, VehicleClass::StandardCar), &[]);
/// assert_eq!(engine.driver_calls(), 1);
/// assert_eq!(engine.booking_calls(), 0);
/// ```
#[derive(Debug)]
pub struct CountingEngine<E = Matcher> {
    inner: E,
    driver_calls: AtomicUsize,
    booking_calls: AtomicUsize,
}

impl<E> CountingEngine<E> {
    /// Wrap `inner`.
    #[must_use]
    pub const fn new(inner: E) -> Self {
        Self {
            inner,
            driver_calls: AtomicUsize::new(0),
            booking_calls: AtomicUsize::new(0),
        }
    }

    /// Runs of [`MatchEngine::match_driver_to_bookings`].
    #[must_use]
    pub fn driver_calls(&self) -> usize {
        self.driver_calls.load(Ordering::SeqCst)
    }

    /// Runs of [`MatchEngine::match_booking_to_drivers`].
    #[must_use]
    pub fn booking_calls(&self) -> usize {
        self.booking_calls.load(Ordering::SeqCst)
    }

    /// The wrapped engine.
    #[must_use]
    pub const fn inner(&self) -> &E {
        &self.inner
    }
}

impl Default for CountingEngine<Matcher> {
    fn default() -> Self {
        Self::new(Matcher::with_defaults())
    }
}

impl<E: MatchEngine> MatchEngine for CountingEngine<E> {
    fn match_driver_to_bookings(
        &self,
        driver: &Driver,
        bookings: &[Booking],
    ) -> Vec<MatchResult<Booking>> {
        self.driver_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.match_driver_to_bookings(driver, bookings)
    }

    fn match_booking_to_drivers(
        &self,
        booking: &Booking,
        drivers: &[Driver],
    ) -> Vec<MatchResult<Driver>> {
        self.booking_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.match_booking_to_drivers(booking, drivers)
    }
}

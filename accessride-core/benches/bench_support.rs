//! Deterministic driver and booking generation for matching benchmarks.
//!
//! Pickups cluster around a handful of centres so repeated coordinate pairs
//! show up the way they do in a busy city.

use accessride_core::{Booking, Driver, LatLng, VehicleClass};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed for deterministic random number generation in benchmarks.
pub const BENCHMARK_SEED: u64 = 42;

/// Number of pickup hotspots.
const HOTSPOT_COUNT: usize = 8;

/// Spread of pickups around a hotspot, in degrees (about 200 m).
const HOTSPOT_SPREAD: f64 = 0.002;

/// South-west corner and extent of the generated area, in degrees.
const AREA_ORIGIN: LatLng = LatLng {
    lat: 51.35,
    lng: -0.35,
};
const AREA_SIZE: f64 = 0.3;

/// Generate `count` approved drivers spread across the area.
#[must_use]
pub fn generate_drivers(count: usize, seed: u64) -> Vec<Driver> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .zip(0_u64..)
        .map(|(_, id)| {
            let class_index = rng.gen_range(0..VehicleClass::RECOGNISED.len());
            let class = VehicleClass::RECOGNISED
                .get(class_index)
                .cloned()
                .unwrap_or(VehicleClass::StandardCar);
            let mut driver = Driver::new(id, class)
                .approved()
                .with_base_location(random_point(&mut rng))
                .with_rating(rng.gen_range(3.0..=5.0))
                .with_completed_rides(rng.gen_range(0..300));
            driver.female_driver = rng.gen_bool(0.3);
            driver
        })
        .collect()
}

/// Generate `count` bookings clustered around a few hotspots.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "benchmark helper offsets coordinates around hotspots"
)]
pub fn generate_bookings(count: usize, seed: u64) -> Vec<Booking> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let hotspots: Vec<LatLng> = (0..HOTSPOT_COUNT)
        .map(|_| random_point(&mut rng))
        .collect();
    (0..count)
        .zip(0_u64..)
        .map(|(_, id)| {
            let centre = hotspots
                .get(rng.gen_range(0..hotspots.len()))
                .copied()
                .unwrap_or(AREA_ORIGIN);
            let pickup = LatLng {
                lat: centre.lat + rng.gen_range(-HOTSPOT_SPREAD..HOTSPOT_SPREAD),
                lng: centre.lng + rng.gen_range(-HOTSPOT_SPREAD..HOTSPOT_SPREAD),
            };
            let mut booking = Booking::new(id)
                .with_pickup_location(pickup)
                .with_ambulatory_passengers(rng.gen_range(0..=3))
                .with_wheelchair_users(rng.gen_range(0..=2));
            booking.accessibility_profile.female_driver_only = rng.gen_bool(0.1);
            booking
        })
        .collect()
}

#[expect(clippy::float_arithmetic, reason = "benchmark helper scales into the area")]
fn random_point(rng: &mut ChaCha8Rng) -> LatLng {
    LatLng {
        lat: AREA_ORIGIN.lat + rng.gen_range(0.0..AREA_SIZE),
        lng: AREA_ORIGIN.lng + rng.gen_range(0.0..AREA_SIZE),
    }
}

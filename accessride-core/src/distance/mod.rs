//! Great-circle distances between pickup points and driver bases.
//!
//! [`haversine_miles`] is the raw calculator. Matching never calls it
//! directly: it goes through a [`DistanceSource`], which first quantises both
//! coordinates to four decimal places (roughly 11 m). The quantised pair is
//! what [`DistanceCache`] keys on, so a cached pass and an uncached pass always
//! agree to the last bit.

mod cache;
mod haversine;

pub use cache::{DistanceCache, DistanceCacheStats};
pub use haversine::{EARTH_RADIUS_MILES, haversine_miles};

use geo::{Coord, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decimal places kept when quantising coordinates for distance lookups.
pub const COORDINATE_PRECISION: i32 = 4;

/// A WGS84 coordinate in decimal degrees.
///
/// Fields are public so records can be built literally; use
/// [`LatLng::new`] when the values come from an untrusted source.
///
/// # Examples
/// ```
/// use accessride_core::LatLng;
///
/// let point = LatLng::new(51.5, -0.12).expect("valid coordinate");
/// assert_eq!(point.lat, 51.5);
/// assert!(LatLng::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees, `-90.0..=90.0`.
    pub lat: f64,
    /// Longitude in degrees, `-180.0..=180.0`.
    pub lng: f64,
}

/// Errors returned by [`LatLng::new`] and [`LatLng::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude was non-finite or outside `-90.0..=90.0`.
    #[error("latitude {0} is outside -90..=90")]
    Latitude(f64),
    /// Longitude was non-finite or outside `-180.0..=180.0`.
    #[error("longitude {0} is outside -180..=180")]
    Longitude(f64),
}

impl LatLng {
    /// Validate and construct a coordinate.
    ///
    /// # Errors
    /// Returns [`CoordinateError`] when either component is out of range.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        let point = Self { lat, lng };
        point.validate()?;
        Ok(point)
    }

    /// Check that both components lie within the WGS84 ranges.
    ///
    /// # Errors
    /// Returns [`CoordinateError`] naming the first offending component.
    pub fn validate(&self) -> Result<(), CoordinateError> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(CoordinateError::Latitude(self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(CoordinateError::Longitude(self.lng));
        }
        Ok(())
    }

    /// Round both components to [`COORDINATE_PRECISION`] decimal places.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "quantisation scales and rounds degrees"
    )]
    pub fn quantised(self) -> Self {
        let scale = 10_f64.powi(COORDINATE_PRECISION);
        Self {
            lat: (self.lat * scale).round() / scale,
            lng: (self.lng * scale).round() / scale,
        }
    }
}

impl From<LatLng> for Coord<f64> {
    fn from(value: LatLng) -> Self {
        Self {
            x: value.lng,
            y: value.lat,
        }
    }
}

impl From<LatLng> for Point<f64> {
    fn from(value: LatLng) -> Self {
        Point(value.into())
    }
}

/// Supplies distances in miles between two coordinates.
///
/// Implementations must be deterministic for a given quantised pair and safe
/// to share across threads.
pub trait DistanceSource: Send + Sync {
    /// Distance in miles between `from` and `to`.
    fn miles(&self, from: LatLng, to: LatLng) -> f64;
}

/// Uncached [`DistanceSource`] over quantised coordinates.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectDistance;

impl DistanceSource for DirectDistance {
    fn miles(&self, from: LatLng, to: LatLng) -> f64 {
        let (a, b) = canonical_pair(from.quantised(), to.quantised());
        haversine_miles(a, b)
    }
}

/// Order a pair so `(a, b)` and `(b, a)` share one cache slot and one result.
pub(crate) fn canonical_pair(a: LatLng, b: LatLng) -> (LatLng, LatLng) {
    let a_key = (a.lat, a.lng);
    let b_key = (b.lat, b.lng);
    if a_key.partial_cmp(&b_key) == Some(std::cmp::Ordering::Greater) {
        (b, a)
    } else {
        (a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(51.50741, -0.12777, 51.5074, -0.1278)]
    #[case(-33.86887, 151.20932, -33.8689, 151.2093)]
    #[case(0.00004, 0.00006, 0.0, 0.0001)]
    fn quantised_rounds_to_four_places(
        #[case] lat: f64,
        #[case] lng: f64,
        #[case] expected_lat: f64,
        #[case] expected_lng: f64,
    ) {
        let point = LatLng { lat, lng }.quantised();
        assert!((point.lat - expected_lat).abs() < 1e-9);
        assert!((point.lng - expected_lng).abs() < 1e-9);
    }

    #[rstest]
    #[case(90.5, 0.0)]
    #[case(-91.0, 0.0)]
    #[case(0.0, 180.1)]
    #[case(f64::NAN, 0.0)]
    fn new_rejects_out_of_range(#[case] lat: f64, #[case] lng: f64) {
        assert!(LatLng::new(lat, lng).is_err());
    }

    #[rstest]
    fn geo_conversions_map_longitude_to_x() {
        let coord: Coord<f64> = LatLng { lat: 1.0, lng: 2.0 }.into();
        assert_eq!(coord, Coord { x: 2.0, y: 1.0 });
        let point = Point::from(LatLng { lat: 1.0, lng: 2.0 });
        assert_eq!((point.x(), point.y()), (2.0, 1.0));
    }

    #[rstest]
    fn direct_distance_is_symmetric() {
        let a = LatLng { lat: 51.5, lng: -0.12 };
        let b = LatLng { lat: 51.7, lng: -0.3 };
        assert_eq!(DirectDistance.miles(a, b), DirectDistance.miles(b, a));
    }
}

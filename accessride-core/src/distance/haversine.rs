//! Haversine great-circle distance in statute miles.

use geo::{Distance, HaversineMeasure, Point};

use super::LatLng;

/// Mean Earth radius used by the calculator, in miles.
pub const EARTH_RADIUS_MILES: f64 = 3_959.0;

const EARTH: HaversineMeasure = HaversineMeasure::new(EARTH_RADIUS_MILES);

/// Great-circle distance in miles between two WGS84 coordinates.
///
/// The function is pure and total for valid coordinates, returning a finite,
/// non-negative value. Out-of-range or non-finite inputs are not validated
/// here; callers must supply coordinates that pass [`LatLng::validate`].
///
/// # Examples
/// ```
/// use accessride_core::{LatLng, haversine_miles};
///
/// let london = LatLng { lat: 51.5074, lng: -0.1278 };
/// let paris = LatLng { lat: 48.8566, lng: 2.3522 };
/// let miles = haversine_miles(london, paris);
/// assert!((miles - 213.5).abs() < 1.0);
/// ```
#[must_use]
pub fn haversine_miles(from: LatLng, to: LatLng) -> f64 {
    let miles = EARTH.distance(Point::from(from), Point::from(to));
    if miles.is_nan() {
        // Rounding can push the haversine term just past 1 for antipodal points.
        half_circumference()
    } else {
        miles
    }
}

#[expect(clippy::float_arithmetic, reason = "radius times pi")]
fn half_circumference() -> f64 {
    EARTH_RADIUS_MILES * std::f64::consts::PI
}

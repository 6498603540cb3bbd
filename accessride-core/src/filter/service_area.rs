//! Service-radius check.
//!
//! A missing base location or pickup location means no restriction: the
//! filter passes with no distance, and proximity later scores zero.

use super::RejectionReason;
use crate::booking::Booking;
use crate::distance::DistanceSource;
use crate::driver::Driver;

/// Pass iff the pickup lies within the driver's radius, returning the
/// distance so scoring can reuse it.
pub(super) fn check(
    driver: &Driver,
    booking: &Booking,
    default_radius_miles: f64,
    distances: &dyn DistanceSource,
) -> Result<Option<f64>, RejectionReason> {
    let (Some(base), Some(pickup)) = (driver.base_location, booking.pickup_location) else {
        return Ok(None);
    };
    let distance_miles = distances.miles(base, pickup);
    let radius_miles = driver
        .service_radius_miles
        .filter(|radius| radius.is_finite())
        .unwrap_or(default_radius_miles);
    if distance_miles <= radius_miles {
        Ok(Some(distance_miles))
    } else {
        Err(RejectionReason::OutsideServiceArea {
            distance_miles,
            radius_miles,
        })
    }
}

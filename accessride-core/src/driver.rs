//! Driver profiles as supplied by the persistence layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::distance::{CoordinateError, LatLng};
use crate::vehicle::VehicleClass;

/// Identifier of a driver record.
pub type DriverId = u64;

/// Highest rating a driver can hold.
pub const MAX_RATING: f64 = 5.0;

/// A driver and the vehicle they operate.
///
/// `female_driver` is a matching attribute only: it never restricts which
/// bookings a driver sees unless the booking itself demands a female driver.
///
/// # Examples
/// ```
/// use accessride_core::{Driver, LatLng, VehicleClass};
///
/// let driver = Driver::new(3, VehicleClass::RearLoadingWav)
///     .approved()
///     .with_base_location(LatLng { lat: 53.48, lng: -2.24 })
///     .with_service_radius(12.0)
///     .with_completed_rides(40);
/// assert!(driver.approved);
/// assert_eq!(driver.service_radius_miles, Some(12.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    /// Stable identifier.
    pub id: DriverId,
    /// Class of the vehicle the driver operates.
    pub vehicle_class: VehicleClass,
    /// Centre of the driver's service area, if recorded.
    #[serde(default)]
    pub base_location: Option<LatLng>,
    /// Service radius in miles; the engine default applies when unset.
    #[serde(default, rename = "serviceRadius")]
    pub service_radius_miles: Option<f64>,
    /// Cleared by an administrator to take work.
    #[serde(default)]
    pub approved: bool,
    /// Temporarily barred from taking work.
    #[serde(default)]
    pub suspended: bool,
    /// Average passenger rating, `0.0..=5.0`.
    #[serde(default)]
    pub rating: f64,
    /// Rides completed on the platform.
    #[serde(default)]
    pub completed_rides: u32,
    /// The driver is female.
    #[serde(default)]
    pub female_driver: bool,
}

/// Validation failures for a [`Driver`] record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DriverError {
    /// The base location is not a valid WGS84 coordinate.
    #[error("driver {id} has an invalid base location: {source}")]
    BaseLocation {
        /// Offending driver.
        id: DriverId,
        /// Coordinate defect.
        source: CoordinateError,
    },
    /// The rating lies outside `0.0..=5.0` or is not finite.
    #[error("driver {id} has rating {rating}, expected 0..=5")]
    Rating {
        /// Offending driver.
        id: DriverId,
        /// Rating found on the record.
        rating: f64,
    },
    /// The service radius is negative or not finite.
    #[error("driver {id} has service radius {radius}, expected a non-negative distance")]
    ServiceRadius {
        /// Offending driver.
        id: DriverId,
        /// Radius found on the record.
        radius: f64,
    },
}

impl Driver {
    /// Create an unapproved driver with no location, rating or history.
    #[must_use]
    pub const fn new(id: DriverId, vehicle_class: VehicleClass) -> Self {
        Self {
            id,
            vehicle_class,
            base_location: None,
            service_radius_miles: None,
            approved: false,
            suspended: false,
            rating: 0.0,
            completed_rides: 0,
            female_driver: false,
        }
    }

    /// Mark the driver as approved.
    #[must_use]
    pub const fn approved(mut self) -> Self {
        self.approved = true;
        self
    }

    /// Mark the driver as suspended.
    #[must_use]
    pub const fn suspended(mut self) -> Self {
        self.suspended = true;
        self
    }

    /// Mark the driver as female.
    #[must_use]
    pub const fn female(mut self) -> Self {
        self.female_driver = true;
        self
    }

    /// Set the base location.
    #[must_use]
    pub const fn with_base_location(mut self, location: LatLng) -> Self {
        self.base_location = Some(location);
        self
    }

    /// Set an explicit service radius in miles.
    #[must_use]
    pub const fn with_service_radius(mut self, miles: f64) -> Self {
        self.service_radius_miles = Some(miles);
        self
    }

    /// Set the rating, clamped into `0.0..=5.0`. Non-finite input becomes 0.
    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = if rating.is_finite() {
            rating.clamp(0.0, MAX_RATING)
        } else {
            0.0
        };
        self
    }

    /// Set the number of completed rides.
    #[must_use]
    pub const fn with_completed_rides(mut self, rides: u32) -> Self {
        self.completed_rides = rides;
        self
    }

    /// Check the record for values the engine cannot reason about.
    ///
    /// Matching itself never calls this; it exists for loaders that want to
    /// reject bad records at the boundary.
    ///
    /// # Errors
    /// Returns [`DriverError`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), DriverError> {
        if let Some(location) = self.base_location {
            location
                .validate()
                .map_err(|source| DriverError::BaseLocation { id: self.id, source })?;
        }
        if !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(DriverError::Rating {
                id: self.id,
                rating: self.rating,
            });
        }
        if let Some(radius) = self.service_radius_miles
            && !(radius.is_finite() && radius >= 0.0)
        {
            return Err(DriverError::ServiceRadius { id: self.id, radius });
        }
        Ok(())
    }

    /// Report whether an edit from `self` to `updated` can change any match
    /// involving this driver.
    ///
    /// # Examples
    /// ```
    /// use accessride_core::{Driver, VehicleClass};
    ///
    /// let before = Driver::new(1, VehicleClass::StandardCar).approved();
    /// assert!(before.matching_fields_differ(&before.clone().suspended()));
    /// ```
    #[must_use]
    pub fn matching_fields_differ(&self, updated: &Self) -> bool {
        self != updated
    }
}

//! Ride requests and the accessibility requirements they carry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::distance::{CoordinateError, LatLng};
use crate::vehicle::LoadingSide;

/// Identifier of a booking record.
pub type BookingId = u64;

/// Breakdown of the chairs and scooters travelling with a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WheelchairConfig {
    /// Powered wheelchairs.
    pub powerchairs: u32,
    /// Manual wheelchairs.
    pub manual_chairs: u32,
    /// Mobility scooters that must be stowed.
    pub mobility_scooters: u32,
    /// The passenger explicitly asked for a double WAV.
    #[serde(rename = "requiresDoubleWAV")]
    pub requires_double_wav: bool,
    /// Preferred side for the ramp or lift.
    pub loading_side: Option<LoadingSide>,
}

/// Structured mobility, capacity and safety requirements of a booking.
///
/// # Examples
/// ```
/// use accessride_core::{AccessibilityProfile, WheelchairConfig};
///
/// let profile = AccessibilityProfile {
///     wheelchair_users: 1,
///     wheelchair_config: WheelchairConfig { powerchairs: 1, manual_chairs: 1, ..Default::default() },
///     ambulatory_passengers: 1,
///     female_driver_only: false,
/// };
/// assert_eq!(profile.wheelchair_demand(), 2);
/// assert_eq!(profile.total_passengers(), 3);
/// assert!(profile.requires_double_wav());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessibilityProfile {
    /// Passengers travelling in a wheelchair.
    pub wheelchair_users: u32,
    /// Chair and scooter breakdown.
    pub wheelchair_config: WheelchairConfig,
    /// Passengers who can use a standard seat.
    pub ambulatory_passengers: u32,
    /// Only a female driver may take the booking.
    pub female_driver_only: bool,
}

impl AccessibilityProfile {
    /// Wheelchairs that must travel secured in the vehicle.
    ///
    /// Profiles may fill in the user count, the chair breakdown, or both;
    /// the larger figure wins.
    #[must_use]
    pub const fn wheelchair_demand(&self) -> u32 {
        let chairs = self
            .wheelchair_config
            .powerchairs
            .saturating_add(self.wheelchair_config.manual_chairs);
        if chairs > self.wheelchair_users {
            chairs
        } else {
            self.wheelchair_users
        }
    }

    /// Everyone travelling, seated or in a wheelchair.
    #[must_use]
    pub const fn total_passengers(&self) -> u32 {
        self.ambulatory_passengers
            .saturating_add(self.wheelchair_demand())
    }

    /// Report whether only a double WAV can take the booking.
    #[must_use]
    pub const fn requires_double_wav(&self) -> bool {
        self.wheelchair_config.requires_double_wav || self.wheelchair_demand() >= 2
    }

    /// Preferred loading side, if any.
    #[must_use]
    pub const fn loading_side(&self) -> Option<LoadingSide> {
        self.wheelchair_config.loading_side
    }
}

/// A ride request awaiting a driver.
///
/// # Examples
/// ```
/// use accessride_core::{Booking, LatLng, LoadingSide};
///
/// let booking = Booking::new(21)
///     .with_pickup_location(LatLng { lat: 51.45, lng: -2.58 })
///     .with_wheelchair_users(1)
///     .with_loading_side(LoadingSide::Rear);
/// assert_eq!(booking.accessibility_profile.wheelchair_demand(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Stable identifier.
    pub id: BookingId,
    /// Where the passengers are collected, if known.
    #[serde(default)]
    pub pickup_location: Option<LatLng>,
    /// Requirements the vehicle and driver must meet.
    #[serde(default)]
    pub accessibility_profile: AccessibilityProfile,
}

/// Validation failures for a [`Booking`] record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BookingError {
    /// The pickup location is not a valid WGS84 coordinate.
    #[error("booking {id} has an invalid pickup location: {source}")]
    PickupLocation {
        /// Offending booking.
        id: BookingId,
        /// Coordinate defect.
        source: CoordinateError,
    },
    /// Nobody is travelling.
    #[error("booking {id} has no passengers")]
    NoPassengers {
        /// Offending booking.
        id: BookingId,
    },
}

impl Booking {
    /// Create a booking with no location and an empty profile.
    #[must_use]
    pub fn new(id: BookingId) -> Self {
        Self {
            id,
            pickup_location: None,
            accessibility_profile: AccessibilityProfile::default(),
        }
    }

    /// Set the pickup location.
    #[must_use]
    pub const fn with_pickup_location(mut self, location: LatLng) -> Self {
        self.pickup_location = Some(location);
        self
    }

    /// Set the number of ambulatory passengers.
    #[must_use]
    pub const fn with_ambulatory_passengers(mut self, count: u32) -> Self {
        self.accessibility_profile.ambulatory_passengers = count;
        self
    }

    /// Set the number of wheelchair users.
    #[must_use]
    pub const fn with_wheelchair_users(mut self, count: u32) -> Self {
        self.accessibility_profile.wheelchair_users = count;
        self
    }

    /// Replace the chair and scooter breakdown.
    #[must_use]
    pub const fn with_wheelchair_config(mut self, config: WheelchairConfig) -> Self {
        self.accessibility_profile.wheelchair_config = config;
        self
    }

    /// Set the number of mobility scooters.
    #[must_use]
    pub const fn with_mobility_scooters(mut self, count: u32) -> Self {
        self.accessibility_profile.wheelchair_config.mobility_scooters = count;
        self
    }

    /// Ask for a double WAV regardless of the wheelchair count.
    #[must_use]
    pub const fn requiring_double_wav(mut self) -> Self {
        self.accessibility_profile.wheelchair_config.requires_double_wav = true;
        self
    }

    /// Set the preferred loading side.
    #[must_use]
    pub const fn with_loading_side(mut self, side: LoadingSide) -> Self {
        self.accessibility_profile.wheelchair_config.loading_side = Some(side);
        self
    }

    /// Require a female driver.
    #[must_use]
    pub const fn female_driver_only(mut self) -> Self {
        self.accessibility_profile.female_driver_only = true;
        self
    }

    /// Check the record for values the engine cannot reason about.
    ///
    /// # Errors
    /// Returns [`BookingError`] naming the first defect.
    pub fn validate(&self) -> Result<(), BookingError> {
        if let Some(location) = self.pickup_location {
            location
                .validate()
                .map_err(|source| BookingError::PickupLocation { id: self.id, source })?;
        }
        if self.accessibility_profile.total_passengers() == 0 {
            return Err(BookingError::NoPassengers { id: self.id });
        }
        Ok(())
    }

    /// Report whether an edit from `self` to `updated` can change any match
    /// involving this booking.
    ///
    /// Only the pickup point and the accessibility profile feed matching.
    #[must_use]
    pub fn matching_fields_differ(&self, updated: &Self) -> bool {
        self.pickup_location != updated.pickup_location
            || self.accessibility_profile != updated.accessibility_profile
    }
}

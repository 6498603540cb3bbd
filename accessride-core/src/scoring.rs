//! Soft scores for eligible pairings.
//!
//! Each component is computed independently and bounded by its own maximum;
//! the total is their plain sum.

use serde::{Deserialize, Serialize};

use crate::booking::AccessibilityProfile;
use crate::driver::MAX_RATING;
use crate::vehicle::VehicleCapability;

/// Highest proximity score.
pub const PROXIMITY_MAX: u32 = 30;
/// Highest rating score.
pub const RATING_MAX: u32 = 20;
/// Highest experience score.
pub const EXPERIENCE_MAX: u32 = 15;
/// Highest vehicle-fit bonus.
pub const VEHICLE_FIT_MAX: u32 = 5;

/// Upper distance bound (exclusive, miles) and score for each proximity band.
const PROXIMITY_BANDS: [(f64, u32); 5] = [(5.0, 30), (10.0, 25), (15.0, 20), (20.0, 15), (25.0, 10)];

/// Lower ride-count bound (inclusive) and score for each experience band.
const EXPERIENCE_BANDS: [(u32, u32); 5] = [(100, 15), (50, 12), (20, 9), (10, 6), (5, 3)];

/// Vehicles with no more seats than this count as an exact fit for an
/// ambulatory party.
const CAR_SEATS: u32 = 6;

/// Per-component scores for one pairing.
///
/// # Examples
/// ```
/// use accessride_core::ScoreBreakdown;
///
/// let breakdown = ScoreBreakdown { proximity: 25, rating: 18, experience: 9, vehicle_fit: 5 };
/// assert_eq!(breakdown.total(), 57);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// Closeness of the driver base to the pickup, `0..=30`.
    pub proximity: u32,
    /// Passenger rating, `0..=20`.
    pub rating: u32,
    /// Completed rides, `0..=15`.
    pub experience: u32,
    /// Exact vehicle fit, `0` or `5`.
    pub vehicle_fit: u32,
}

impl ScoreBreakdown {
    /// Score a pairing that passed every filter.
    #[must_use]
    pub fn compute(
        distance_miles: Option<f64>,
        rating: f64,
        completed_rides: u32,
        capability: &VehicleCapability,
        profile: &AccessibilityProfile,
    ) -> Self {
        Self {
            proximity: proximity_score(distance_miles),
            rating: rating_score(rating),
            experience: experience_score(completed_rides),
            vehicle_fit: vehicle_fit_bonus(capability, profile),
        }
    }

    /// Sum of all components.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.proximity + self.rating + self.experience + self.vehicle_fit
    }
}

/// Banded proximity score. An unknown distance scores zero.
///
/// # Examples
/// ```
/// use accessride_core::scoring::proximity_score;
///
/// assert_eq!(proximity_score(Some(4.9)), 30);
/// assert_eq!(proximity_score(Some(5.0)), 25);
/// assert_eq!(proximity_score(None), 0);
/// ```
#[must_use]
pub fn proximity_score(distance_miles: Option<f64>) -> u32 {
    let Some(miles) = distance_miles else {
        return 0;
    };
    PROXIMITY_BANDS
        .iter()
        .find(|(limit, _)| miles < *limit)
        .map_or(0, |(_, score)| *score)
}

/// `round(rating / 5 * 20)`, with out-of-range ratings clamped first.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "the clamped product lies in 0..=20"
)]
pub fn rating_score(rating: f64) -> u32 {
    if !rating.is_finite() {
        return 0;
    }
    let scaled = rating.clamp(0.0, MAX_RATING) / MAX_RATING * f64::from(RATING_MAX);
    scaled.round() as u32
}

/// Banded experience score.
#[must_use]
pub fn experience_score(completed_rides: u32) -> u32 {
    EXPERIENCE_BANDS
        .iter()
        .find(|(floor, _)| completed_rides >= *floor)
        .map_or(0, |(_, score)| *score)
}

/// Bonus for a vehicle that fits the party exactly rather than by a margin.
///
/// Over-qualified vehicles earn nothing but lose nothing either.
#[must_use]
pub fn vehicle_fit_bonus(capability: &VehicleCapability, profile: &AccessibilityProfile) -> u32 {
    let demand = profile.wheelchair_demand();
    let exact_capacity = match demand {
        0 => !capability.is_wav && capability.max_passengers <= CAR_SEATS,
        1 => capability.is_wav && capability.wheelchair_capacity == 1,
        2 => capability.is_double_wav && capability.wheelchair_capacity == 2,
        _ => capability.wheelchair_capacity == demand,
    };
    let loading_matched = profile
        .loading_side()
        .is_some_and(|side| capability.loading_type.satisfies(side));
    if exact_capacity || loading_matched {
        VEHICLE_FIT_MAX
    } else {
        0
    }
}

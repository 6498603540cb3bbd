//! Core matching engine for accessible-transport bookings.
//!
//! The crate decides which drivers may take which bookings and ranks the
//! eligible pairs:
//!
//! - **Hard filters** reject a pairing outright: approval and suspension,
//!   vehicle capability against the passenger's accessibility profile, a
//!   female-driver requirement, and the driver's service area.
//! - **Soft scores** rank the survivors: proximity, rating, experience, and
//!   a small bonus for an exact vehicle fit.
//!
//! [`Matcher`] runs both stages in either direction: one driver against many
//! bookings, or one booking against many drivers. Repeated geodistance
//! lookups go through a bounded [`DistanceCache`].
//!
//! # Examples
//!
//! ```
//! use accessride_core::{Booking, Driver, LatLng, MatchEngine, Matcher, VehicleClass};
//!
//! let base = LatLng { lat: 51.5074, lng: -0.1278 };
//! let driver = Driver::new(7, VehicleClass::StandardCar)
//!     .approved()
//!     .with_base_location(base)
//!     .with_rating(4.5);
//! let booking = Booking::new(11)
//!     .with_pickup_location(LatLng { lat: 51.5155, lng: -0.1419 })
//!     .with_ambulatory_passengers(2);
//!
//! let matcher = Matcher::with_defaults();
//! let results = matcher.match_driver_to_bookings(&driver, &[booking]);
//! assert_eq!(results.len(), 1);
//! assert_eq!(results[0].score_breakdown.vehicle_fit, 5);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod booking;
pub mod config;
pub mod distance;
pub mod driver;
pub mod filter;
pub mod matcher;
pub mod scoring;
pub mod vehicle;

#[cfg(feature = "test-support")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use booking::{AccessibilityProfile, Booking, BookingError, BookingId, WheelchairConfig};
pub use config::{LoadingSidePolicy, MatchConfig, MatchConfigError};
pub use distance::{
    CoordinateError, DirectDistance, DistanceCache, DistanceCacheStats, DistanceSource, LatLng,
    haversine_miles,
};
pub use driver::{Driver, DriverError, DriverId};
pub use filter::{FilterKind, FilterOutcome, Rejection, RejectionReason};
pub use matcher::{Assessment, Evaluation, MatchEngine, MatchResult, Matcher};
pub use scoring::ScoreBreakdown;
pub use vehicle::{
    CapabilityEntry, CapabilityTable, CapabilityTableError, LoadingSide, LoadingType,
    VehicleCapability, VehicleClass,
};

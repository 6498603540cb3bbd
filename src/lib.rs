//! Facade crate for the accessride matching engine.
//!
//! This crate re-exports the core matching types and exposes the result cache
//! behind the `cache` feature.
//!
//! ```
//! use accessride::{Booking, Driver, MatchEngine, Matcher, VehicleClass};
//!
//! let driver = Driver::new(1, VehicleClass::RearLoadingWav).approved();
//! let booking = Booking::new(2).with_wheelchair_users(1);
//! let ranked = Matcher::with_defaults().match_driver_to_bookings(&driver, &[booking]);
//! assert_eq!(ranked.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use accessride_core::{
    AccessibilityProfile, Assessment, Booking, BookingError, BookingId, CapabilityEntry,
    CapabilityTable, CapabilityTableError, CoordinateError, DirectDistance, DistanceCache,
    DistanceCacheStats, DistanceSource, Driver, DriverError, DriverId, Evaluation, FilterKind,
    FilterOutcome, LatLng, LoadingSide, LoadingSidePolicy, LoadingType, MatchConfig,
    MatchConfigError, MatchEngine, MatchResult, Matcher, Rejection, RejectionReason,
    ScoreBreakdown, VehicleCapability, VehicleClass, WheelchairConfig, haversine_miles,
};

#[cfg(feature = "cache")]
#[cfg_attr(docsrs, doc(cfg(feature = "cache")))]
pub use accessride_cache::{
    BackendError, CacheBackend, CacheStats, CachedMatcher, Clock, MemoryBackend,
    ResultCacheConfig, SystemClock, WriteBehindError,
};

/// Test fixtures from the member crates.
#[cfg(feature = "test-support")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support {
    pub use accessride_core::test_support::*;

    #[cfg(feature = "cache")]
    pub use accessride_cache::test_support::{ManualClock, UnavailableBackend};
}

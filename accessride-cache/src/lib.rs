//! Result caching for the accessride matching engine.
//!
//! [`CachedMatcher`] wraps any [`MatchEngine`](accessride_core::MatchEngine)
//! and keeps each ranked list for a configurable TTL, keyed by the driver or
//! booking it was computed for. Writes happen in the background through
//! [`WriteBehind`], invalidation is explicit, and a failing backend only ever
//! costs a recomputation.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use accessride_cache::{CachedMatcher, MemoryBackend, ResultCacheConfig};
//! use accessride_core::{Booking, Driver, MatchEngine, Matcher, VehicleClass};
//!
//! let matcher = CachedMatcher::new(
//!     Matcher::with_defaults(),
//!     Arc::new(MemoryBackend::new()),
//!     ResultCacheConfig::default().with_ttl(Duration::from_secs(30)),
//! );
//! let booking = Booking::new(3).with_wheelchair_users(1);
//! let drivers = [Driver::new(1, VehicleClass::SideLoadingWav).approved()];
//!
//! let ranked = matcher.match_booking_to_drivers(&booking, &drivers);
//! assert_eq!(ranked.len(), 1);
//!
//! // The wheelchair user now needs a rear loader; drop the stale list.
//! matcher.invalidate_booking(booking.id);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backend;
pub mod config;
pub mod matcher;
pub mod store;
pub mod writer;

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use backend::{BackendError, CacheBackend, Clock, MemoryBackend, SystemClock};
pub use config::{DEFAULT_KEY_PREFIX, DEFAULT_TTL, ResultCacheConfig};
pub use matcher::CachedMatcher;
pub use store::{Anchor, CacheStats, Candidate, Lookup, ResultCache, Stamp};
pub use writer::{WriteBehind, WriteBehindError};

//! TTL cache of ranked match lists keyed by anchor.
//!
//! Every stored list is wrapped in an envelope carrying the epoch and the
//! anchor's generation at the moment the computation started. Invalidating
//! an anchor bumps its generation; invalidating everything bumps the epoch.
//! A read only trusts an envelope whose stamp is still current, so a
//! background write that lands after an invalidation is ignored.
//!
//! The cache also remembers which anchors were ranked from which candidates.
//! Invalidating a driver therefore also invalidates every booking list that
//! was computed with that driver as a candidate, and the other way round.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use accessride_core::{Booking, BookingId, Driver, DriverId, MatchResult};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::backend::{BackendError, CacheBackend};
use crate::config::ResultCacheConfig;
use crate::writer::WriteBehind;

/// Entity whose candidate list is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Bookings ranked for a driver.
    Driver(DriverId),
    /// Drivers ranked for a booking.
    Booking(BookingId),
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Driver(id) => write!(f, "driver:{id}"),
            Self::Booking(id) => write!(f, "booking:{id}"),
        }
    }
}

/// Record type that can be ranked as a candidate.
pub trait Candidate {
    /// Anchor under which this record's own list is cached.
    fn anchor(&self) -> Anchor;
}

impl Candidate for Driver {
    fn anchor(&self) -> Anchor {
        Anchor::Driver(self.id)
    }
}

impl Candidate for Booking {
    fn anchor(&self) -> Anchor {
        Anchor::Booking(self.id)
    }
}

/// Point-in-time counters for a [`ResultCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that had to run the matcher.
    pub misses: u64,
    /// Backend or codec failures, on reads and background writes alike.
    pub backend_errors: u64,
    /// Writes handed to the background writer.
    pub writes_submitted: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    backend_errors: AtomicU64,
    writes_submitted: AtomicU64,
}

impl Counters {
    fn record_backend_error(&self, action: &str, key: &str, err: &BackendError) {
        self.backend_errors.fetch_add(1, Ordering::Relaxed);
        warn!("result cache {action} failed for {key}: {err}");
    }
}

/// Stamp taken when a lookup misses, to be written alongside the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    epoch: u64,
    generation: u64,
}

/// Outcome of [`ResultCache::lookup`].
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<C> {
    /// A current list was found.
    Hit(Vec<MatchResult<C>>),
    /// Nothing usable was found; store fresh results with this stamp.
    Miss(Stamp),
}

#[derive(Serialize)]
struct EnvelopeRef<'a, C> {
    stamp: Stamp,
    results: &'a [MatchResult<C>],
}

#[derive(Deserialize)]
struct Envelope<C> {
    stamp: Stamp,
    results: Vec<MatchResult<C>>,
}

/// Ranked-list cache over a [`CacheBackend`].
///
/// Reads run inline; writes and deletes go through a [`WriteBehind`] so the
/// caller never waits on the backend.
pub struct ResultCache<B> {
    backend: Arc<B>,
    config: ResultCacheConfig,
    writer: WriteBehind,
    epoch: AtomicU64,
    generations: Mutex<HashMap<Anchor, u64>>,
    // candidate -> anchors whose lists were ranked from it
    dependents: Mutex<HashMap<Anchor, HashSet<Anchor>>>,
    counters: Arc<Counters>,
}

impl<B> fmt::Debug for ResultCache<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCache")
            .field("config", &self.config)
            .field("writer", &self.writer)
            .field("epoch", &self.epoch.load(Ordering::Relaxed))
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl<B: CacheBackend + 'static> ResultCache<B> {
    /// Cache over `backend`, writing through `writer`.
    #[must_use]
    pub fn new(backend: Arc<B>, config: ResultCacheConfig, writer: WriteBehind) -> Self {
        Self {
            backend,
            config,
            writer,
            epoch: AtomicU64::new(0),
            generations: Mutex::new(HashMap::new()),
            dependents: Mutex::new(HashMap::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Active settings.
    #[must_use]
    pub const fn config(&self) -> &ResultCacheConfig {
        &self.config
    }

    /// Backend key for `anchor`.
    #[must_use]
    pub fn key(&self, anchor: Anchor) -> String {
        format!("{}:{anchor}", self.config.key_prefix)
    }

    /// Fetch the current list for `anchor`, or a stamp to store a fresh one.
    ///
    /// Backend and decode failures are logged and reported as a miss.
    #[must_use]
    pub fn lookup<C: DeserializeOwned>(&self, anchor: Anchor) -> Lookup<C> {
        let stamp = self.current_stamp(anchor);
        let key = self.key(anchor);
        match self.read::<C>(&key) {
            Ok(Some(envelope)) if envelope.stamp == stamp => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!("result cache hit for {key}");
                return Lookup::Hit(envelope.results);
            }
            Ok(Some(_)) => debug!("result cache entry for {key} is stale"),
            Ok(None) => debug!("result cache miss for {key}"),
            Err(err) => self.counters.record_backend_error("read", &key, &err),
        }
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        Lookup::Miss(stamp)
    }

    /// Remember that the list for `anchor` is being ranked from `candidates`.
    ///
    /// Call this after a miss and before computing, so an invalidation of any
    /// candidate that races with the computation still reaches `anchor`.
    pub fn track<C: Candidate>(&self, anchor: Anchor, candidates: &[C]) {
        let mut dependents = self
            .dependents
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for candidate in candidates {
            dependents
                .entry(candidate.anchor())
                .or_default()
                .insert(anchor);
        }
    }

    /// Queue `results` for storage under `anchor`.
    ///
    /// Returns immediately. Encode failures are logged and counted.
    pub fn store<C: Serialize>(&self, anchor: Anchor, stamp: Stamp, results: &[MatchResult<C>]) {
        let key = self.key(anchor);
        let bytes = match serde_json::to_vec(&EnvelopeRef { stamp, results }) {
            Ok(bytes) => bytes,
            Err(err) => {
                self.counters
                    .record_backend_error("encode", &key, &BackendError::from(err));
                return;
            }
        };
        let backend = Arc::clone(&self.backend);
        let counters = Arc::clone(&self.counters);
        let ttl = self.config.ttl;
        self.counters.writes_submitted.fetch_add(1, Ordering::Relaxed);
        self.writer.submit(move || {
            if let Err(err) = backend.set(&key, bytes, ttl) {
                counters.record_backend_error("write", &key, &err);
            }
        });
    }

    /// Make any cached list for `anchor` unreachable and queue its removal.
    ///
    /// Lists ranked with `anchor` as a candidate are invalidated too.
    pub fn invalidate(&self, anchor: Anchor) {
        let dependents = self
            .dependents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&anchor)
            .unwrap_or_default();
        let affected: Vec<Anchor> = std::iter::once(anchor)
            .chain(dependents.into_iter().filter(|dependent| *dependent != anchor))
            .collect();
        {
            let mut generations = self
                .generations
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for target in &affected {
                let generation = generations.entry(*target).or_insert(0);
                *generation = generation.wrapping_add(1);
            }
        }
        for target in affected {
            self.queue_delete(target);
        }
    }

    /// Make every cached list unreachable and queue a backend clear.
    pub fn invalidate_all(&self) {
        {
            let mut generations = self
                .generations
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            self.epoch.fetch_add(1, Ordering::SeqCst);
            generations.clear();
        }
        self.dependents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!("invalidating every result cache entry");
        let backend = Arc::clone(&self.backend);
        let counters = Arc::clone(&self.counters);
        self.writer.submit(move || {
            if let Err(err) = backend.clear() {
                counters.record_backend_error("clear", "*", &err);
            }
        });
    }

    /// Block until queued writes and deletes have reached the backend.
    pub fn flush(&self) {
        self.writer.flush();
    }

    fn queue_delete(&self, anchor: Anchor) {
        let key = self.key(anchor);
        debug!("invalidating result cache entry {key}");
        let backend = Arc::clone(&self.backend);
        let counters = Arc::clone(&self.counters);
        self.writer.submit(move || {
            if let Err(err) = backend.delete(&key) {
                counters.record_backend_error("delete", &key, &err);
            }
        });
    }

    fn current_stamp(&self, anchor: Anchor) -> Stamp {
        // The epoch only moves under this lock, so the pair is consistent.
        let generations = self
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Stamp {
            epoch: self.epoch.load(Ordering::SeqCst),
            generation: generations.get(&anchor).copied().unwrap_or(0),
        }
    }

    fn read<C: DeserializeOwned>(&self, key: &str) -> Result<Option<Envelope<C>>, BackendError> {
        let Some(bytes) = self.backend.get(key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

impl<B> ResultCache<B> {
    /// Snapshot of the hit, miss, error and write counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            backend_errors: self.counters.backend_errors.load(Ordering::Relaxed),
            writes_submitted: self.counters.writes_submitted.load(Ordering::Relaxed),
        }
    }
}

//! Test doubles for exercising the cache without wall-clock waits or a live
//! backend.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::backend::{BackendError, CacheBackend, Clock};

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }
}

impl ManualClock {
    /// Move the clock forward by `step`, saturating at the latest
    /// representable instant.
    pub fn advance(&self, step: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(next) = now.checked_add(step) {
            *now = next;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Backend whose every call fails, standing in for an unreachable store.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableBackend;

impl UnavailableBackend {
    fn refuse<T>() -> Result<T, BackendError> {
        Err(BackendError::Unavailable {
            reason: "connection refused".to_owned(),
        })
    }
}

impl CacheBackend for UnavailableBackend {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        Self::refuse()
    }

    fn set(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> Result<(), BackendError> {
        Self::refuse()
    }

    fn delete(&self, _key: &str) -> Result<(), BackendError> {
        Self::refuse()
    }

    fn clear(&self) -> Result<(), BackendError> {
        Self::refuse()
    }
}

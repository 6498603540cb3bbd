//! Key-value storage behind the result cache.
//!
//! The trait is synchronous so the matcher stays embeddable in synchronous
//! request handlers. Writes are pushed off the request path by
//! [`WriteBehind`](crate::WriteBehind); reads happen inline and must fail fast
//! when the store is unreachable.

mod memory;

pub use memory::{Clock, MemoryBackend, SystemClock};

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Failures reported by a [`CacheBackend`].
///
/// None of these ever reaches a match caller: the cache logs them and falls
/// back to direct computation.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The store could not be reached or refused the request.
    #[error("cache backend unavailable: {reason}")]
    Unavailable {
        /// Backend-specific description.
        reason: String,
    },
    /// A thread panicked while holding the store's lock.
    #[error("cache backend lock poisoned")]
    LockPoisoned,
    /// A cached value could not be encoded or decoded.
    #[error("cached value could not be encoded or decoded: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Key-value store with per-entry expiry.
pub trait CacheBackend: Send + Sync {
    /// Fetch a live value.
    ///
    /// # Errors
    /// Returns [`BackendError`] when the store cannot answer.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// Store `value` under `key` for `ttl`, replacing any previous value.
    ///
    /// # Errors
    /// Returns [`BackendError`] when the store rejects the write.
    fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), BackendError>;

    /// Remove `key` if present.
    ///
    /// # Errors
    /// Returns [`BackendError`] when the store rejects the delete.
    fn delete(&self, key: &str) -> Result<(), BackendError>;

    /// Remove every entry.
    ///
    /// # Errors
    /// Returns [`BackendError`] when the store rejects the request.
    fn clear(&self) -> Result<(), BackendError>;
}

impl<T: CacheBackend + ?Sized> CacheBackend for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), BackendError> {
        (**self).set(key, value, ttl)
    }

    fn delete(&self, key: &str) -> Result<(), BackendError> {
        (**self).delete(key)
    }

    fn clear(&self) -> Result<(), BackendError> {
        (**self).clear()
    }
}

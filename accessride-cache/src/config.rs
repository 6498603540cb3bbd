//! Result cache settings.

use std::time::Duration;

/// How long a ranked list stays valid by default.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Namespace prepended to every key by default.
pub const DEFAULT_KEY_PREFIX: &str = "accessride";

/// Settings for a [`ResultCache`](crate::ResultCache).
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use accessride_cache::ResultCacheConfig;
///
/// let config = ResultCacheConfig::default().with_ttl(Duration::from_secs(15));
/// assert_eq!(config.key_prefix, "accessride");
/// assert_eq!(config.ttl, Duration::from_secs(15));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCacheConfig {
    /// Lifetime of each cached list.
    pub ttl: Duration,
    /// Namespace for keys, so several deployments can share one store.
    pub key_prefix: String,
}

impl Default for ResultCacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            key_prefix: DEFAULT_KEY_PREFIX.to_owned(),
        }
    }
}

impl ResultCacheConfig {
    /// Replace the TTL.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Replace the key prefix.
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }
}

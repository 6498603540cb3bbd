//! Engine configuration.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Radius applied to drivers who have not set their own.
pub const DEFAULT_SERVICE_RADIUS_MILES: f64 = 25.0;

/// Coordinate pairs retained by the distance cache.
pub const DEFAULT_DISTANCE_CACHE_CAPACITY: usize = 10_000;

/// How a booking's preferred loading side affects matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingSidePolicy {
    /// A vehicle whose loading type differs is rejected.
    #[default]
    Required,
    /// Any loading type is eligible; a matching one earns the fit bonus.
    Preferred,
}

impl LoadingSidePolicy {
    /// Return the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Preferred => "preferred",
        }
    }
}

impl fmt::Display for LoadingSidePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoadingSidePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "required" => Ok(Self::Required),
            "preferred" => Ok(Self::Preferred),
            other => Err(format!(
                "unknown loading-side policy '{other}', expected 'required' or 'preferred'"
            )),
        }
    }
}

/// Tunables for a [`Matcher`](crate::Matcher).
///
/// # Examples
/// ```
/// use accessride_core::{LoadingSidePolicy, MatchConfig};
///
/// let config: MatchConfig = serde_json::from_str(r#"{ "loading_side": "preferred" }"#)
///     .expect("valid config");
/// assert_eq!(config.loading_side, LoadingSidePolicy::Preferred);
/// assert_eq!(config.default_service_radius_miles, 25.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Service radius for drivers without their own, in miles.
    pub default_service_radius_miles: f64,
    /// Maximum coordinate pairs held by the distance cache.
    pub distance_cache_capacity: usize,
    /// Whether to memoise distances at all.
    pub distance_cache_enabled: bool,
    /// Treatment of a preferred loading side.
    pub loading_side: LoadingSidePolicy,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            default_service_radius_miles: DEFAULT_SERVICE_RADIUS_MILES,
            distance_cache_capacity: DEFAULT_DISTANCE_CACHE_CAPACITY,
            distance_cache_enabled: true,
            loading_side: LoadingSidePolicy::default(),
        }
    }
}

/// Invalid [`MatchConfig`] values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchConfigError {
    /// The default radius is not a positive, finite distance.
    #[error("default service radius must be positive and finite, got {0}")]
    ServiceRadius(f64),
    /// The distance cache is enabled with no room for entries.
    #[error("distance cache capacity must be non-zero when the cache is enabled")]
    ZeroCacheCapacity,
}

impl MatchConfig {
    /// Check every field.
    ///
    /// # Errors
    /// Returns [`MatchConfigError`] for the first invalid field.
    pub fn validate(&self) -> Result<(), MatchConfigError> {
        let radius = self.default_service_radius_miles;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(MatchConfigError::ServiceRadius(radius));
        }
        self.cache_capacity().map(|_| ())
    }

    /// Capacity for the distance cache, or `None` when caching is disabled.
    pub(crate) fn cache_capacity(&self) -> Result<Option<NonZeroUsize>, MatchConfigError> {
        if !self.distance_cache_enabled {
            return Ok(None);
        }
        NonZeroUsize::new(self.distance_cache_capacity)
            .map(Some)
            .ok_or(MatchConfigError::ZeroCacheCapacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_are_valid() {
        let config = MatchConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.loading_side, LoadingSidePolicy::Required);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-5.0)]
    #[case(f64::INFINITY)]
    #[case(f64::NAN)]
    fn rejects_bad_radius(#[case] radius: f64) {
        let config = MatchConfig {
            default_service_radius_miles: radius,
            ..MatchConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MatchConfigError::ServiceRadius(_))
        ));
    }

    #[rstest]
    fn zero_capacity_only_matters_when_enabled() {
        let mut config = MatchConfig {
            distance_cache_capacity: 0,
            ..MatchConfig::default()
        };
        assert_eq!(config.validate(), Err(MatchConfigError::ZeroCacheCapacity));
        config.distance_cache_enabled = false;
        assert_eq!(config.validate(), Ok(()));
    }

    #[rstest]
    #[case("required", LoadingSidePolicy::Required)]
    #[case(" Preferred ", LoadingSidePolicy::Preferred)]
    fn parses_policy(#[case] raw: &str, #[case] expected: LoadingSidePolicy) {
        assert_eq!(raw.parse::<LoadingSidePolicy>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_policy() {
        assert!("sometimes".parse::<LoadingSidePolicy>().is_err());
    }
}

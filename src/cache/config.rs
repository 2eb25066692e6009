//! Cache configuration.
//!
//! Selects the caching strategy and snapshot lifetime via `vetrina.toml`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

// Default values for cache configuration
const DEFAULT_LIST_TTL_SECS: u64 = 3600;

/// Which portion of the catalog the cache holds.
///
/// The strategies are mutually exclusive; the service never mixes them
/// within one process. Switching strategies across a deploy is safe because
/// they use disjoint keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheStrategy {
    /// Cache the whole serialized product list, invalidate on any write.
    ListSnapshot,
    /// Cache per-product like counters, fold them into store reads.
    EntityCounter,
}

impl CacheStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStrategy::ListSnapshot => "list-snapshot",
            CacheStrategy::EntityCounter => "entity-counter",
        }
    }
}

impl fmt::Display for CacheStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheStrategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "list-snapshot" => Ok(CacheStrategy::ListSnapshot),
            "entity-counter" => Ok(CacheStrategy::EntityCounter),
            other => Err(format!(
                "unknown cache strategy {other:?}, expected \"list-snapshot\" or \"entity-counter\""
            )),
        }
    }
}

/// Cache configuration from `vetrina.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Active caching strategy.
    pub strategy: CacheStrategy,
    /// Lifetime of the list snapshot in seconds. Bounds staleness when an
    /// invalidation is lost; irrelevant under the entity-counter strategy.
    pub list_ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            strategy: CacheStrategy::ListSnapshot,
            list_ttl_seconds: DEFAULT_LIST_TTL_SECS,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            strategy: settings.strategy,
            list_ttl_seconds: settings.list_ttl_seconds,
        }
    }
}

impl CacheConfig {
    /// Returns the list snapshot lifetime as a `Duration`.
    pub fn list_ttl(&self) -> Duration {
        Duration::from_secs(self.list_ttl_seconds)
    }
}

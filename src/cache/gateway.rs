use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::ProductRecord;

/// Errors surfaced by a cache backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The backend refused or failed the command.
    #[error("cache backend error: {0}")]
    Backend(String),
    /// A stored payload could not be decoded. This is data corruption, not
    /// a miss, and is never silently treated as one.
    #[error("corrupt cache payload: {0}")]
    Payload(String),
    /// The backend did not answer within the configured deadline.
    #[error("cache operation timed out")]
    Timeout,
}

impl CacheError {
    pub fn backend(err: impl fmt::Display) -> Self {
        CacheError::Backend(err.to_string())
    }

    pub fn payload(err: impl fmt::Display) -> Self {
        CacheError::Payload(err.to_string())
    }
}

/// Outcome of a cache write the caller does not depend on.
///
/// Snapshot write-backs and invalidations keep the cache warm and fresh but
/// never gate the store operation they accompany; their failures are
/// recorded, not propagated. Operations the coherence protocol does depend
/// on (counter seeding on the write path, the counter increment itself)
/// stay on plain `Result` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BestEffort {
    /// The write reached the backend.
    Applied,
    /// The write was attempted and failed.
    Failed(CacheError),
}

impl BestEffort {
    pub fn from_result(result: Result<(), CacheError>) -> Self {
        match result {
            Ok(()) => BestEffort::Applied,
            Err(err) => BestEffort::Failed(err),
        }
    }

    /// Returns the error if the write failed.
    pub fn failed(&self) -> Option<&CacheError> {
        match self {
            BestEffort::Failed(err) => Some(err),
            BestEffort::Applied => None,
        }
    }
}

/// Look-aside cache capability over the product keyspace.
///
/// Implementations expose the raw keyspace operations; coherence between
/// cache and store is the caller's job. A disabled backend reports
/// [`Self::enabled`] false and still answers every read with a miss and
/// every write with a neutral success.
#[async_trait]
pub trait ProductCache: Send + Sync {
    /// Whether a real backend is attached. When false, the repository skips
    /// coherence work instead of issuing no-op commands.
    fn enabled(&self) -> bool;

    /// Fetches the cached list snapshot. `None` is a miss; a present but
    /// undecodable snapshot is a [`CacheError::Payload`].
    async fn list(&self) -> Result<Option<Vec<ProductRecord>>, CacheError>;

    /// Stores the full list snapshot with the given lifetime.
    async fn put_list(&self, products: &[ProductRecord], ttl: Duration) -> Result<(), CacheError>;

    /// Drops the list snapshot. Idempotent; dropping an absent snapshot
    /// succeeds.
    async fn invalidate_list(&self) -> Result<(), CacheError>;

    /// Fetches one product's like counter, `None` on a miss.
    async fn counter(&self, id: i64) -> Result<Option<i64>, CacheError>;

    /// Fetches many counters in one round trip. The result has the same
    /// length and order as `ids`, with `None` where no counter exists.
    async fn counters(&self, ids: &[i64]) -> Result<Vec<Option<i64>>, CacheError>;

    /// Initializes a product's counter to `value` unless one already
    /// exists. Concurrent seeders race benignly; exactly one write wins and
    /// the rest see the established counter.
    async fn seed_counter(&self, id: i64, value: i64) -> Result<(), CacheError>;

    /// Atomically adds one to a product's counter and returns the new
    /// value. Callers seed the counter from the store first so an increment
    /// never manufactures a zero baseline for a product with prior likes.
    async fn increment_counter(&self, id: i64) -> Result<i64, CacheError>;
}

/// Cache capability for deployments without a cache backend.
///
/// Every read misses and every write succeeds without effect, keeping the
/// repository's cache branches well-defined even though it consults
/// [`ProductCache::enabled`] and skips them.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCache;

#[async_trait]
impl ProductCache for NullCache {
    fn enabled(&self) -> bool {
        false
    }

    async fn list(&self) -> Result<Option<Vec<ProductRecord>>, CacheError> {
        Ok(None)
    }

    async fn put_list(
        &self,
        _products: &[ProductRecord],
        _ttl: Duration,
    ) -> Result<(), CacheError> {
        Ok(())
    }

    async fn invalidate_list(&self) -> Result<(), CacheError> {
        Ok(())
    }

    async fn counter(&self, _id: i64) -> Result<Option<i64>, CacheError> {
        Ok(None)
    }

    async fn counters(&self, ids: &[i64]) -> Result<Vec<Option<i64>>, CacheError> {
        Ok(vec![None; ids.len()])
    }

    async fn seed_counter(&self, _id: i64, _value: i64) -> Result<(), CacheError> {
        Ok(())
    }

    async fn increment_counter(&self, _id: i64) -> Result<i64, CacheError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rust_decimal::Decimal;

    fn product(id: i64) -> ProductRecord {
        ProductRecord {
            id,
            name: format!("product {id}"),
            description: String::new(),
            price: Decimal::new(0, 2),
            image_url: String::new(),
            likes: 0,
        }
    }

    #[tokio::test]
    async fn null_cache_reads_all_miss() {
        let cache = NullCache;
        assert!(!cache.enabled());
        assert_eq!(cache.list().await, Ok(None));
        assert_eq!(cache.counter(3).await, Ok(None));
        assert_eq!(
            cache.counters(&[1, 2, 3]).await,
            Ok(vec![None, None, None])
        );
    }

    #[tokio::test]
    async fn null_cache_writes_are_neutral() {
        let cache = NullCache;
        let snapshot = vec![product(1)];
        assert_eq!(
            cache.put_list(&snapshot, Duration::from_secs(60)).await,
            Ok(())
        );
        assert_eq!(cache.invalidate_list().await, Ok(()));
        assert_eq!(cache.seed_counter(1, 5).await, Ok(()));
    }

    #[test]
    fn best_effort_from_result() {
        assert_eq!(BestEffort::from_result(Ok(())), BestEffort::Applied);
        let failed = BestEffort::from_result(Err(CacheError::Timeout));
        assert_eq!(failed.failed(), Some(&CacheError::Timeout));
        assert!(BestEffort::Applied.failed().is_none());
    }
}

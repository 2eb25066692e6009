//! Cache-coherent product repository.
//!
//! Composes the durable store and the cache behind [`ProductsRepo`] and
//! owns every coherence rule: when the cache is consulted, how writes
//! propagate, and which cache failures are swallowed versus surfaced.

use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use tracing::warn;

use crate::application::repos::{ProductStore, ProductsRepo, RepoError};
use crate::domain::entities::ProductRecord;

use super::config::{CacheConfig, CacheStrategy};
use super::gateway::{BestEffort, ProductCache};

const METRIC_LIST_HIT: &str = "vetrina_cache_list_hit_total";
const METRIC_LIST_MISS: &str = "vetrina_cache_list_miss_total";
const METRIC_COUNTER_HIT: &str = "vetrina_cache_counter_hit_total";
const METRIC_COUNTER_MISS: &str = "vetrina_cache_counter_miss_total";
const METRIC_WRITEBACK_FAILURE: &str = "vetrina_cache_writeback_failure_total";

/// Product repository with look-aside caching.
///
/// The store is the eventual source of truth; the cache accelerates reads
/// within a bounded staleness window. Exactly one [`CacheStrategy`] is
/// active per process:
///
/// - **list-snapshot**: `list_products` serves a cached snapshot when
///   present, refills it on a miss, and `like_product` invalidates it after
///   the store write. Snapshot write-back and invalidation are best-effort.
/// - **entity-counter**: reads always hit the store for product rows and
///   fold the cached like counter into each row; `like_product` increments
///   the cache counter (the authority for the increment sequence) and
///   mirrors the exact result into the store.
///
/// With the cache disabled every operation degrades to plain store access
/// with identical observable behavior.
pub struct CachedProducts {
    store: Arc<dyn ProductStore>,
    cache: Arc<dyn ProductCache>,
    config: CacheConfig,
}

impl CachedProducts {
    pub fn new(
        store: Arc<dyn ProductStore>,
        cache: Arc<dyn ProductCache>,
        config: CacheConfig,
    ) -> Self {
        Self {
            store,
            cache,
            config,
        }
    }

    /// Record a best-effort cache write that failed. The enclosing
    /// operation has already succeeded against the store; the cache repairs
    /// itself on the next miss or when the snapshot ttl expires.
    fn note_write_back(&self, op: &'static str, outcome: &BestEffort) {
        if let Some(err) = outcome.failed() {
            counter!(METRIC_WRITEBACK_FAILURE).increment(1);
            warn!(op, error = %err, "cache write-back failed, store result stands");
        }
    }

    async fn list_via_snapshot(&self) -> Result<Vec<ProductRecord>, RepoError> {
        if let Some(products) = self.cache.list().await? {
            counter!(METRIC_LIST_HIT).increment(1);
            return Ok(products);
        }
        counter!(METRIC_LIST_MISS).increment(1);

        let products = self.store.fetch_all().await?;
        let write_back = BestEffort::from_result(
            self.cache
                .put_list(&products, self.config.list_ttl())
                .await,
        );
        self.note_write_back("put_list", &write_back);
        Ok(products)
    }

    async fn list_via_counters(&self) -> Result<Vec<ProductRecord>, RepoError> {
        let mut products = self.store.fetch_all().await?;
        if products.is_empty() {
            return Ok(products);
        }

        let ids: Vec<i64> = products.iter().map(|product| product.id).collect();
        let counters = self.cache.counters(&ids).await?;
        for (product, cached) in products.iter_mut().zip(counters) {
            match cached {
                Some(likes) => {
                    counter!(METRIC_COUNTER_HIT).increment(1);
                    product.likes = likes;
                }
                // On a miss the row's own counter stands; the cache entry
                // appears once the product is next liked.
                None => counter!(METRIC_COUNTER_MISS).increment(1),
            }
        }
        Ok(products)
    }

    async fn like_via_counter(&self, id: i64) -> Result<(), RepoError> {
        // Baseline comes from the primary. Seeding from a replica-lagged
        // row could start the counter below the store and lose increments.
        let Some(current) = self.store.fetch_likes(id).await? else {
            return Err(RepoError::NotFound);
        };
        self.cache.seed_counter(id, current).await?;
        let likes = self.cache.increment_counter(id).await?;

        // The increment already happened from the cache's perspective, so a
        // store failure past this point propagates: the two stores are
        // inconsistent and the caller must know.
        self.store.put_likes(id, likes).await
    }
}

#[async_trait]
impl ProductsRepo for CachedProducts {
    async fn list_products(&self) -> Result<Vec<ProductRecord>, RepoError> {
        if !self.cache.enabled() {
            return self.store.fetch_all().await;
        }
        match self.config.strategy {
            CacheStrategy::ListSnapshot => self.list_via_snapshot().await,
            CacheStrategy::EntityCounter => self.list_via_counters().await,
        }
    }

    async fn find_product(&self, id: i64) -> Result<Option<ProductRecord>, RepoError> {
        // Single-item reads always hit the store for the row itself; only
        // the like counter may come from the cache.
        let Some(mut product) = self.store.fetch_by_id(id).await? else {
            return Ok(None);
        };

        if self.cache.enabled() && self.config.strategy == CacheStrategy::EntityCounter {
            match self.cache.counter(id).await? {
                Some(likes) => {
                    counter!(METRIC_COUNTER_HIT).increment(1);
                    product.likes = likes;
                }
                None => counter!(METRIC_COUNTER_MISS).increment(1),
            }
        }
        Ok(Some(product))
    }

    async fn like_product(&self, id: i64) -> Result<(), RepoError> {
        if !self.cache.enabled() {
            return self.store.increment_likes(id).await;
        }
        match self.config.strategy {
            CacheStrategy::ListSnapshot => {
                self.store.increment_likes(id).await?;
                let invalidated = BestEffort::from_result(self.cache.invalidate_list().await);
                self.note_write_back("invalidate_list", &invalidated);
                Ok(())
            }
            CacheStrategy::EntityCounter => self.like_via_counter(id).await,
        }
    }
}

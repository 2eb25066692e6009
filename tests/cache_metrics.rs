//! Cache metric emission coverage.
//!
//! A debugging recorder captures everything the cached repository emits
//! while both strategies run their hit, miss, and failed write-back paths,
//! then the snapshot is checked for the expected metric keys.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use metrics_util::debugging::DebuggingRecorder;
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use vetrina::application::repos::{ProductStore, ProductsRepo, RepoError};
use vetrina::cache::{CacheConfig, CacheError, CacheStrategy, CachedProducts, ProductCache};
use vetrina::domain::entities::ProductRecord;

fn product(id: i64, likes: i64) -> ProductRecord {
    ProductRecord {
        id,
        name: format!("product-{id}"),
        description: String::new(),
        price: Decimal::new(500, 2),
        image_url: String::new(),
        likes,
    }
}

fn seeded_store() -> Arc<MemoryStore> {
    let mut rows = BTreeMap::new();
    rows.insert(1, product(1, 2));
    rows.insert(2, product(2, 0));
    Arc::new(MemoryStore {
        rows: Mutex::new(rows),
    })
}

struct MemoryStore {
    rows: Mutex<BTreeMap<i64, ProductRecord>>,
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<ProductRecord>, RepoError> {
        Ok(self.rows.lock().await.values().cloned().collect())
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<ProductRecord>, RepoError> {
        Ok(self.rows.lock().await.get(&id).cloned())
    }

    async fn fetch_likes(&self, id: i64) -> Result<Option<i64>, RepoError> {
        Ok(self.rows.lock().await.get(&id).map(|row| row.likes))
    }

    async fn increment_likes(&self, id: i64) -> Result<(), RepoError> {
        match self.rows.lock().await.get_mut(&id) {
            Some(row) => {
                row.likes += 1;
                Ok(())
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn put_likes(&self, id: i64, likes: i64) -> Result<(), RepoError> {
        match self.rows.lock().await.get_mut(&id) {
            Some(row) => {
                row.likes = row.likes.max(likes);
                Ok(())
            }
            None => Err(RepoError::NotFound),
        }
    }
}

#[derive(Default)]
struct MemoryCache {
    snapshot: Mutex<Option<Vec<ProductRecord>>>,
    counters: Mutex<HashMap<i64, i64>>,
    fail_invalidate: AtomicBool,
}

#[async_trait]
impl ProductCache for MemoryCache {
    fn enabled(&self) -> bool {
        true
    }

    async fn list(&self) -> Result<Option<Vec<ProductRecord>>, CacheError> {
        Ok(self.snapshot.lock().await.clone())
    }

    async fn put_list(&self, products: &[ProductRecord], _ttl: Duration) -> Result<(), CacheError> {
        *self.snapshot.lock().await = Some(products.to_vec());
        Ok(())
    }

    async fn invalidate_list(&self) -> Result<(), CacheError> {
        if self.fail_invalidate.load(Ordering::SeqCst) {
            return Err(CacheError::backend("DEL refused"));
        }
        *self.snapshot.lock().await = None;
        Ok(())
    }

    async fn counter(&self, id: i64) -> Result<Option<i64>, CacheError> {
        Ok(self.counters.lock().await.get(&id).copied())
    }

    async fn counters(&self, ids: &[i64]) -> Result<Vec<Option<i64>>, CacheError> {
        let counters = self.counters.lock().await;
        Ok(ids.iter().map(|id| counters.get(id).copied()).collect())
    }

    async fn seed_counter(&self, id: i64, value: i64) -> Result<(), CacheError> {
        self.counters.lock().await.entry(id).or_insert(value);
        Ok(())
    }

    async fn increment_counter(&self, id: i64) -> Result<i64, CacheError> {
        let mut counters = self.counters.lock().await;
        let value = counters.entry(id).or_insert(0);
        *value += 1;
        Ok(*value)
    }
}

#[tokio::test]
async fn cache_paths_emit_expected_metric_keys() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    // Snapshot strategy: one miss fills the cache, one hit serves from it,
    // and a refused invalidation records a write-back failure.
    let snapshot_cache = Arc::new(MemoryCache::default());
    let snapshot_repo = CachedProducts::new(
        seeded_store(),
        snapshot_cache.clone(),
        CacheConfig {
            strategy: CacheStrategy::ListSnapshot,
            ..Default::default()
        },
    );
    snapshot_repo.list_products().await.expect("miss then fill");
    snapshot_repo.list_products().await.expect("hit");
    snapshot_cache.fail_invalidate.store(true, Ordering::SeqCst);
    snapshot_repo
        .like_product(1)
        .await
        .expect("like despite refused invalidation");

    // Counter strategy: a seeded counter hits, the other row misses.
    let counter_cache = Arc::new(MemoryCache::default());
    counter_cache.seed_counter(1, 4).await.expect("seed");
    let counter_repo = CachedProducts::new(
        seeded_store(),
        counter_cache,
        CacheConfig {
            strategy: CacheStrategy::EntityCounter,
            ..Default::default()
        },
    );
    counter_repo.find_product(1).await.expect("counter hit");
    counter_repo.find_product(2).await.expect("counter miss");

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    let expected = [
        "vetrina_cache_list_hit_total",
        "vetrina_cache_list_miss_total",
        "vetrina_cache_counter_hit_total",
        "vetrina_cache_counter_miss_total",
        "vetrina_cache_writeback_failure_total",
    ];

    for metric in expected {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}

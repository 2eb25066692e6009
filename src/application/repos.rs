//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::cache::CacheError;
use crate::domain::entities::ProductRecord;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("database timeout")]
    Timeout,
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Durable-store gateway for products. Fetches run on the read pool,
/// mutations on the write pool, so replica reads can be routed away from
/// the primary.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products ordered by id ascending; an empty catalog is an empty
    /// vec, not an error.
    async fn fetch_all(&self) -> Result<Vec<ProductRecord>, RepoError>;

    /// `None` means "no such id" and is distinct from a transport failure.
    async fn fetch_by_id(&self, id: i64) -> Result<Option<ProductRecord>, RepoError>;

    /// Current like counter, read through the write pool so a seed derived
    /// from it can never lag the primary.
    async fn fetch_likes(&self, id: i64) -> Result<Option<i64>, RepoError>;

    /// Atomic conditional `likes = likes + 1`; zero rows affected surfaces
    /// as [`RepoError::NotFound`].
    async fn increment_likes(&self, id: i64) -> Result<(), RepoError>;

    /// Mirror a cache-authoritative counter value into the store. The
    /// merge is monotonic, so mirrors that complete out of order cannot
    /// regress the counter. Zero rows affected surfaces as
    /// [`RepoError::NotFound`].
    async fn put_likes(&self, id: i64, likes: i64) -> Result<(), RepoError>;
}

/// The repository contract the service layer sees. Implementations decide
/// per operation whether the cache is consulted and how writes propagate.
#[async_trait]
pub trait ProductsRepo: Send + Sync {
    async fn list_products(&self) -> Result<Vec<ProductRecord>, RepoError>;

    async fn find_product(&self, id: i64) -> Result<Option<ProductRecord>, RepoError>;

    async fn like_product(&self, id: i64) -> Result<(), RepoError>;
}

//! Look-aside caching for the product catalog.
//!
//! The cache is a bounded-staleness accelerator, never an authority; the
//! relational store remains the eventual source of truth. Two mutually
//! exclusive strategies are supported, flagged in `vetrina.toml`:
//!
//! ```toml
//! [cache]
//! host = "127.0.0.1"
//! strategy = "list-snapshot"   # or "entity-counter"
//! list_ttl_seconds = 3600
//! ```
//!
//! - **list-snapshot**: cache the whole serialized product list under one
//!   key and invalidate it wholesale on any like.
//! - **entity-counter**: cache only the per-product like counter, re-derive
//!   everything else from the store on every read, and fold the cached
//!   counter in at read time.

mod config;
mod gateway;
mod keys;
mod repository;

pub use config::{CacheConfig, CacheStrategy};
pub use gateway::{BestEffort, CacheError, NullCache, ProductCache};
pub use keys::CacheKey;
pub use repository::CachedProducts;

//! Postgres-backed product store.

mod products;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::{
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::config::DatabaseSettings;

/// Product store over two Postgres pools.
///
/// Fetches run on the read pool, mutations on the write pool. Both may
/// point at the same server; splitting them lets a deployment route list
/// and detail reads to a replica while likes go to the primary.
#[derive(Clone)]
pub struct PostgresProducts {
    read_pool: Arc<PgPool>,
    write_pool: Arc<PgPool>,
}

impl PostgresProducts {
    pub fn new(read_pool: PgPool, write_pool: PgPool) -> Self {
        Self {
            read_pool: Arc::new(read_pool),
            write_pool: Arc::new(write_pool),
        }
    }

    pub fn read_pool(&self) -> &PgPool {
        &self.read_pool
    }

    pub fn write_pool(&self) -> &PgPool {
        &self.write_pool
    }

    /// Open a pool with the configured limits. The acquire timeout bounds
    /// the startup probe so a wrong endpoint fails fast instead of hanging.
    pub async fn connect(url: &str, settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(settings.max_connections.get())
            .max_lifetime(settings.max_lifetime)
            .acquire_timeout(settings.acquire_timeout)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.read_pool()).await.map(|_| ())
    }
}

use std::time::Duration;

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo,
    aio::ConnectionManager,
};

use crate::cache::{CacheError, CacheKey, ProductCache};
use crate::config::CacheSettings;
use crate::domain::entities::ProductRecord;

use super::error::InfraError;

const CONNECT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis-backed product cache.
///
/// Holds a multiplexed connection manager that reconnects on its own;
/// each command clones the handle, which is cheap and safe across tasks.
#[derive(Clone)]
pub struct RedisProductCache {
    manager: ConnectionManager,
}

impl RedisProductCache {
    /// Connect and probe the server. The probe is bounded so a wrong
    /// endpoint fails startup fast instead of hanging.
    pub async fn connect(host: &str, settings: &CacheSettings) -> Result<Self, InfraError> {
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(host.to_string(), settings.port),
            redis: RedisConnectionInfo {
                db: settings.db,
                username: None,
                password: settings.password.clone(),
                ..Default::default()
            },
        };
        let client = Client::open(info)
            .map_err(|err| InfraError::cache(format!("invalid redis endpoint: {err}")))?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(|err| InfraError::cache(format!("redis connection failed: {err}")))?;

        let probe = tokio::time::timeout(CONNECT_PROBE_TIMEOUT, async {
            let mut conn = manager.clone();
            let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<String, redis::RedisError>(pong)
        })
        .await;

        match probe {
            Ok(Ok(_)) => Ok(Self { manager }),
            Ok(Err(err)) => Err(InfraError::cache(format!("redis ping failed: {err}"))),
            Err(_) => Err(InfraError::cache(format!(
                "redis ping timed out after {}s",
                CONNECT_PROBE_TIMEOUT.as_secs()
            ))),
        }
    }
}

fn map_redis_error(err: redis::RedisError) -> CacheError {
    if err.is_timeout() {
        CacheError::Timeout
    } else {
        CacheError::backend(err)
    }
}

fn parse_counter(raw: &str) -> Result<i64, CacheError> {
    raw.parse::<i64>()
        .map_err(|_| CacheError::Payload(format!("counter is not an integer: {raw:?}")))
}

#[async_trait]
impl ProductCache for RedisProductCache {
    fn enabled(&self) -> bool {
        true
    }

    async fn list(&self) -> Result<Option<Vec<ProductRecord>>, CacheError> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = conn
            .get(CacheKey::List.to_string())
            .await
            .map_err(map_redis_error)?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let products = serde_json::from_str(&raw).map_err(CacheError::payload)?;
        Ok(Some(products))
    }

    async fn put_list(&self, products: &[ProductRecord], ttl: Duration) -> Result<(), CacheError> {
        let payload = serde_json::to_string(products).map_err(CacheError::payload)?;
        let mut conn = self.manager.clone();
        let _: () = conn
            .set_ex(CacheKey::List.to_string(), payload, ttl.as_secs())
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn invalidate_list(&self) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        // DEL of an absent key reports zero removed, which is still success.
        let _: i64 = conn
            .del(CacheKey::List.to_string())
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn counter(&self, id: i64) -> Result<Option<i64>, CacheError> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = conn
            .get(CacheKey::Likes(id).to_string())
            .await
            .map_err(map_redis_error)?;
        raw.as_deref().map(parse_counter).transpose()
    }

    async fn counters(&self, ids: &[i64]) -> Result<Vec<Option<i64>>, CacheError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let keys: Vec<String> = ids
            .iter()
            .map(|id| CacheKey::Likes(*id).to_string())
            .collect();
        let mut conn = self.manager.clone();
        let raw: Vec<Option<String>> = conn.mget(&keys).await.map_err(map_redis_error)?;
        raw.into_iter()
            .map(|entry| entry.as_deref().map(parse_counter).transpose())
            .collect()
    }

    async fn seed_counter(&self, id: i64, value: i64) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let _: bool = conn
            .set_nx(CacheKey::Likes(id).to_string(), value)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn increment_counter(&self, id: i64) -> Result<i64, CacheError> {
        let mut conn = self.manager.clone();
        let value: i64 = conn
            .incr(CacheKey::Likes(id).to_string(), 1)
            .await
            .map_err(map_redis_error)?;
        Ok(value)
    }
}

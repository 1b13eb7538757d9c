//! Redis-based cache implementation.

use super::CacheInterface;
use async_trait::async_trait;
use cachet_config::RedisConfig;
use cachet_core::{CachetError, CachetResult};
use deadpool_redis::{redis::AsyncCommands, Config, Pool, Runtime};
use shaku::Component;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Redis-based cache service.
///
/// Without a pool the service is disabled: reads always miss and writes are
/// no-ops.
#[derive(Component)]
#[shaku(interface = CacheInterface)]
pub struct RedisCacheService {
    pool: Option<Arc<Pool>>,
}

impl RedisCacheService {
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// Create a no-op cache service (for when Redis is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    async fn get_conn(&self) -> CachetResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool.get().await.map_err(|e| {
                CachetError::Cache(format!("Failed to get Redis connection: {}", e))
            }),
            None => Err(CachetError::Cache("Cache is disabled".to_string())),
        }
    }
}

#[async_trait]
impl CacheInterface for RedisCacheService {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn get_raw(&self, key: &str) -> CachetResult<Option<String>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.get(key).await.map_err(|e| {
            CachetError::Cache(format!("Failed to get key '{}': {}", key, e))
        })?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> CachetResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        match ttl {
            Some(ttl) => {
                let ttl_secs = ttl.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, ttl_secs).await.map_err(|e| {
                    CachetError::Cache(format!("Failed to set key '{}': {}", key, e))
                })?;
                debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
            }
            None => {
                conn.set::<_, _, ()>(key, value).await.map_err(|e| {
                    CachetError::Cache(format!("Failed to set key '{}': {}", key, e))
                })?;
                debug!("Cached key '{}'", key);
            }
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> CachetResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let mut conn = self.get_conn().await?;
        let deleted: i64 = conn.del(key).await.map_err(|e| {
            CachetError::Cache(format!("Failed to delete key '{}': {}", key, e))
        })?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(deleted > 0)
    }
}

/// Creates the Redis pool, or `None` when the cache is disabled.
///
/// An unreachable server is logged, not fatal: the pool reconnects on use
/// and until then every listing is served from the store.
pub async fn create_redis_pool(config: &RedisConfig) -> CachetResult<Option<Arc<Pool>>> {
    if !config.enabled {
        info!("Redis cache disabled");
        return Ok(None);
    }

    info!("Creating Redis connection pool...");
    let url = config.connection_url()?;

    let pool = Config::from_url(url)
        .builder()
        .map_err(|e| CachetError::Configuration(format!("Invalid Redis config: {}", e)))?
        .max_size(config.pool_size)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| CachetError::Configuration(format!("Failed to create Redis pool: {}", e)))?;

    match pool.get().await {
        Ok(mut conn) => {
            match deadpool_redis::redis::cmd("PING")
                .query_async::<String>(&mut *conn)
                .await
            {
                Ok(_) => info!("Redis connection pool created successfully"),
                Err(e) => warn!("Redis PING failed, continuing without cache hits: {}", e),
            }
        }
        Err(e) => warn!("Redis unreachable at startup, continuing without cache hits: {}", e),
    }

    Ok(Some(Arc::new(pool)))
}

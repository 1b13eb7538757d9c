//! Cache interface trait for abstracted caching operations.

use async_trait::async_trait;
use cachet_core::CachetResult;
use shaku::Interface;
use std::time::Duration;

/// Key-value cache holding JSON strings.
#[async_trait]
pub trait CacheInterface: Interface + Send + Sync {
    /// Get a raw JSON value. `None` if the key is absent or expired.
    async fn get_raw(&self, key: &str) -> CachetResult<Option<String>>;

    /// Set a raw JSON value. Without a TTL the entry lives until deleted.
    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> CachetResult<()>;

    /// Delete a value, returning `true` if the key existed.
    async fn delete(&self, key: &str) -> CachetResult<bool>;

    /// Check if caching is enabled.
    fn is_enabled(&self) -> bool;
}

/// Typed JSON access on top of [`CacheInterface`].
#[async_trait]
pub trait CacheExt: CacheInterface {
    /// Get a typed value. A payload that does not decode is an error.
    async fn get<T>(&self, key: &str) -> CachetResult<Option<T>>
    where
        T: serde::de::DeserializeOwned + Send,
    {
        match self.get_raw(key).await? {
            Some(json) => {
                let value: T = serde_json::from_str(&json)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Set a typed value.
    async fn set<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> CachetResult<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json, ttl).await
    }
}

impl<T: CacheInterface + ?Sized> CacheExt for T {}

//! Caching infrastructure for the service layer.
//!
//! The cache is a disposable projection of the record store. Nothing in it
//! is authoritative, and every failure here degrades to reading the store.

mod cache_interface;
pub mod cache_keys;
mod redis_cache;

#[cfg(any(test, feature = "testing"))]
pub mod memory;

pub use cache_interface::{CacheExt, CacheInterface};
pub use redis_cache::{create_redis_pool, RedisCacheService, RedisCacheServiceParameters};

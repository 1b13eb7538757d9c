//! In-memory cache for tests.

use super::CacheInterface;
use async_trait::async_trait;
use cachet_core::{CachetError, CachetResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// A [`CacheInterface`] over a `HashMap`, with switches to simulate a Redis
/// outage per operation.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, String>>,
    last_ttl: Mutex<Option<Duration>>,
    deletes: AtomicUsize,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    fail_delete: AtomicBool,
}

impl InMemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_get(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Writes an entry directly, bypassing the failure switches.
    pub fn insert(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).get(key).cloned()
    }

    /// Number of delete calls received, including failed ones.
    pub fn delete_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// TTL passed to the most recent successful set.
    pub fn last_ttl(&self) -> Option<Duration> {
        *self.last_ttl.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn outage(op: &str) -> CachetError {
        CachetError::Cache(format!("{op} failed: connection refused"))
    }
}

#[async_trait]
impl CacheInterface for InMemoryCache {
    async fn get_raw(&self, key: &str) -> CachetResult<Option<String>> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(Self::outage("GET"));
        }
        Ok(self.peek(key))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Option<Duration>) -> CachetResult<()> {
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(Self::outage("SET"));
        }
        self.insert(key, value);
        *self.last_ttl.lock().unwrap_or_else(PoisonError::into_inner) = ttl;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CachetResult<bool> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Self::outage("DEL"));
        }
        Ok(self.entries.lock().unwrap_or_else(PoisonError::into_inner).remove(key).is_some())
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

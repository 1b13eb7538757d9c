//! In-memory stores for tests.

use crate::traits::UserStore;
use async_trait::async_trait;
use cachet_core::{CachetError, CachetResult, NewUser, UserId, UserRecord};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// A [`UserStore`] over a `Vec`, with switches to simulate store outages.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    rows: Mutex<Vec<UserRecord>>,
    next_id: Mutex<i32>,
    select_calls: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with users named `user{n}`.
    #[must_use]
    pub fn with_users(count: usize) -> Self {
        let store = Self::new();
        {
            let mut rows = store.rows.lock().unwrap_or_else(PoisonError::into_inner);
            let mut next = store.next_id.lock().unwrap_or_else(PoisonError::into_inner);
            for n in 0..count {
                *next += 1;
                rows.push(UserRecord {
                    id: UserId::from_raw(*next),
                    name: format!("user{n}"),
                    email: format!("user{n}@example.com"),
                });
            }
        }
        store
    }

    /// Number of `select_all` calls served so far.
    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Vec<UserRecord> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn outage() -> CachetError {
        CachetError::Database("store unavailable".to_string())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: &NewUser) -> CachetResult<UserRecord> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }

        let mut next = self.next_id.lock().unwrap_or_else(PoisonError::into_inner);
        *next += 1;
        let record = UserRecord {
            id: UserId::from_raw(*next),
            name: user.name.clone(),
            email: user.email.clone(),
        };
        self.rows.lock().unwrap_or_else(PoisonError::into_inner).push(record.clone());
        Ok(record)
    }

    async fn delete_by_id(&self, id: UserId) -> CachetResult<u64> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }

        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        let before = rows.len();
        rows.retain(|u| u.id != id);
        Ok((before - rows.len()) as u64)
    }

    async fn select_all(&self) -> CachetResult<Vec<UserRecord>> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }
        Ok(self.snapshot())
    }
}

//! User gateway trait definition.

use async_trait::async_trait;
use cachet_core::{CachetResult, Interface, NewUser, UserId, UserList, UserRecord};

/// Outcome of the cache invalidation that follows every successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// The cached listing was removed; the next read goes to the store.
    Invalidated,
    /// The delete failed. The cached listing may be stale until the next
    /// successful invalidation or its TTL.
    Failed(String),
}

impl Invalidation {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// A durable write together with the invalidation it triggered.
#[must_use = "a failed invalidation leaves stale data in the cache"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written<T> {
    pub value: T,
    pub invalidation: Invalidation,
}

impl<T> Written<T> {
    pub const fn new(value: T, invalidation: Invalidation) -> Self {
        Self { value, invalidation }
    }

    /// Splits into the value and the invalidation status.
    pub fn into_parts(self) -> (T, Invalidation) {
        (self.value, self.invalidation)
    }
}

/// Cache-aside access to users.
#[async_trait]
pub trait UserGateway: Interface + Send + Sync {
    /// Lists every user, from the cache when present, else from the store
    /// (repopulating the cache on the way out).
    async fn list(&self) -> CachetResult<UserList>;

    /// Validates and inserts a user, then invalidates the cached listing.
    async fn create(&self, user: NewUser) -> CachetResult<Written<UserRecord>>;

    /// Deletes a user by id, then invalidates the cached listing.
    ///
    /// Yields the number of rows removed. Whether zero rows is an error
    /// depends on the configured `MissingDeletePolicy`.
    async fn delete(&self, id: UserId) -> CachetResult<Written<u64>>;
}

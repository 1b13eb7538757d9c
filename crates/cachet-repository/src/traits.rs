//! Record store trait definitions.

use async_trait::async_trait;
use cachet_core::{CachetResult, Interface, NewUser, UserId, UserRecord};

/// Durable storage for user records. The relational store is the source of
/// truth; everything cached is derived from `select_all`.
#[async_trait]
pub trait UserStore: Interface + Send + Sync {
    /// Inserts a user and returns it with its store-assigned id.
    async fn insert(&self, user: &NewUser) -> CachetResult<UserRecord>;

    /// Deletes by id, returning the number of rows removed.
    async fn delete_by_id(&self, id: UserId) -> CachetResult<u64>;

    /// Returns every user, ordered by id.
    async fn select_all(&self) -> CachetResult<Vec<UserRecord>>;
}

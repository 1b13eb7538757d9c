//! Cache-aside user gateway.
//!
//! Reads try the cached listing first and fall back to the store, writing
//! the result back. Writes go to the store and then delete the cached
//! listing. The delete runs after the write commits, so a concurrent miss
//! can recache the pre-write listing between the two; that entry survives
//! until the next write or the configured TTL.

use crate::cache::{cache_keys, CacheExt, CacheInterface};
use crate::user_gateway::{Invalidation, UserGateway, Written};
use async_trait::async_trait;
use cachet_config::MissingDeletePolicy;
use cachet_core::{
    CachetError, CachetResult, ListSource, NewUser, UserId, UserList, UserRecord, ValidateExt,
};
use cachet_repository::UserStore;
use shaku::Component;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// User gateway over a [`UserStore`] and a [`CacheInterface`].
#[derive(Component)]
#[shaku(interface = UserGateway)]
pub struct UserCacheGateway {
    #[shaku(inject)]
    store: Arc<dyn UserStore>,
    #[shaku(inject)]
    cache: Arc<dyn CacheInterface>,
    /// Expiry for the cached listing; `None` keeps it until invalidated.
    list_ttl: Option<Duration>,
    missing_delete: MissingDeletePolicy,
}

impl UserCacheGateway {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, cache: Arc<dyn CacheInterface>) -> Self {
        Self {
            store,
            cache,
            list_ttl: None,
            missing_delete: MissingDeletePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_list_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.list_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_missing_delete(mut self, policy: MissingDeletePolicy) -> Self {
        self.missing_delete = policy;
        self
    }

    async fn invalidate(&self) -> Invalidation {
        match self.cache.delete(cache_keys::USER_LIST).await {
            Ok(existed) => {
                debug!("Invalidated cached user list (present: {})", existed);
                Invalidation::Invalidated
            }
            Err(e) => {
                error!(
                    "Failed to invalidate cached user list, reads may be stale: {}",
                    e
                );
                Invalidation::Failed(e.to_string())
            }
        }
    }
}

#[async_trait]
impl UserGateway for UserCacheGateway {
    async fn list(&self) -> CachetResult<UserList> {
        match self.cache.get::<Vec<UserRecord>>(cache_keys::USER_LIST).await {
            Ok(Some(users)) => {
                debug!("Serving {} users from cache", users.len());
                return Ok(UserList {
                    users,
                    source: ListSource::Cache,
                });
            }
            Ok(None) => {}
            Err(e) => warn!("Cache read failed, falling back to store: {}", e),
        }

        let users = self.store.select_all().await?;
        debug!("Loaded {} users from store", users.len());

        if let Err(e) = self.cache.set(cache_keys::USER_LIST, &users, self.list_ttl).await {
            warn!("Failed to populate cached user list: {}", e);
        }

        Ok(UserList {
            users,
            source: ListSource::Store,
        })
    }

    async fn create(&self, user: NewUser) -> CachetResult<Written<UserRecord>> {
        user.validate_request()?;

        let record = self.store.insert(&user).await?;
        info!("User created: {}", record.id);

        let invalidation = self.invalidate().await;
        Ok(Written::new(record, invalidation))
    }

    async fn delete(&self, id: UserId) -> CachetResult<Written<u64>> {
        let removed = self.store.delete_by_id(id).await?;
        let invalidation = self.invalidate().await;

        if removed == 0 {
            match self.missing_delete {
                MissingDeletePolicy::Ignore => debug!("Delete of missing user {} ignored", id),
                MissingDeletePolicy::NotFound => return Err(CachetError::not_found("User", id)),
            }
        } else {
            info!("User deleted: {}", id);
        }

        Ok(Written::new(removed, invalidation))
    }
}

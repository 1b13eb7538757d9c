//! Dependency injection module using Shaku.
//!
//! `AppModule` holds the whole single-process stack:
//! - Database pool and the user store
//! - Redis cache (or the disabled no-op cache)
//! - Upload directory blob store
//! - The user and upload gateways

use cachet_config::AppConfig;
use cachet_core::{module, CachetResult, HasComponent};
use cachet_repository::{
    DatabasePool, DatabasePoolInterface, DatabasePoolParameters, FilesystemBlobStore,
    FilesystemBlobStoreParameters, PgUserStore,
};
use cachet_service::{
    create_redis_pool, FileUploadGateway, FileUploadGatewayParameters, RedisCacheService,
    RedisCacheServiceParameters, UploadGateway, UploadLimits, UserCacheGateway,
    UserCacheGatewayParameters, UserGateway,
};
use deadpool_redis::Pool;
use std::sync::Arc;
use tracing::info;

module! {
    pub AppModule {
        components = [
            DatabasePool,
            PgUserStore,
            RedisCacheService,
            FilesystemBlobStore,
            UserCacheGateway,
            FileUploadGateway,
        ],
        providers = [],
    }
}

impl AppModule {
    #[must_use]
    pub fn user_gateway(&self) -> Arc<dyn UserGateway> {
        self.resolve()
    }

    #[must_use]
    pub fn upload_gateway(&self) -> Arc<dyn UploadGateway> {
        self.resolve()
    }

    #[must_use]
    pub fn database_pool(&self) -> Arc<dyn DatabasePoolInterface> {
        self.resolve()
    }
}

/// Connects every backend named in `config` and builds the module.
pub async fn build_app_module(config: &AppConfig) -> CachetResult<Arc<AppModule>> {
    let db_pool = DatabasePool::connect(&config.database).await?;
    let cache_pool = create_redis_pool(&config.redis).await?;
    let blobs = FilesystemBlobStore::new(config.uploads.directory_path()).await?;

    info!("Upload directory: {}", blobs.root().display());

    Ok(Arc::new(assemble_module(&db_pool, cache_pool, &blobs, config)))
}

/// Builds the module from already-opened backends.
#[must_use]
pub fn assemble_module(
    db_pool: &DatabasePool,
    cache_pool: Option<Arc<Pool>>,
    blobs: &FilesystemBlobStore,
    config: &AppConfig,
) -> AppModule {
    AppModule::builder()
        .with_component_parameters::<DatabasePool>(DatabasePoolParameters {
            pool: db_pool.inner().clone(),
        })
        .with_component_parameters::<RedisCacheService>(RedisCacheServiceParameters {
            pool: cache_pool,
        })
        .with_component_parameters::<FilesystemBlobStore>(FilesystemBlobStoreParameters {
            root: blobs.root().to_path_buf(),
        })
        .with_component_parameters::<UserCacheGateway>(UserCacheGatewayParameters {
            list_ttl: config.cache.user_list_ttl(),
            missing_delete: config.users.missing_delete,
        })
        .with_component_parameters::<FileUploadGateway>(FileUploadGatewayParameters {
            limits: UploadLimits::from(&config.uploads),
        })
        .build()
}

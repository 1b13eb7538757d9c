//! Database connection pool management.

use async_trait::async_trait;
use cachet_config::DatabaseConfig;
use cachet_core::{CachetError, CachetResult, Interface};
use shaku::Component;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use std::str::FromStr;
use tracing::{info, warn};

/// Interface for database pool operations.
#[async_trait]
pub trait DatabasePoolInterface: Interface + Send + Sync {
    /// Returns a reference to the underlying PostgreSQL pool.
    fn inner(&self) -> &PgPool;

    /// Checks if the database connection is healthy.
    async fn health_check(&self) -> CachetResult<()>;

    /// Closes the database pool.
    async fn close(&self);
}

/// Database pool wrapper.
#[derive(Component)]
#[shaku(interface = DatabasePoolInterface)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Connects a new pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> CachetResult<Self> {
        info!("Connecting to PostgreSQL database...");

        let options = connect_options(config)?;
        let pool = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(Some(config.idle_timeout()))
            .connect_with(options)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                CachetError::Database(format!("Failed to connect: {}", e))
            })?;

        info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    /// Builds a pool that opens connections on first use.
    pub fn connect_lazy(config: &DatabaseConfig) -> CachetResult<Self> {
        let options = connect_options(config)?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .connect_lazy_with(options);
        Ok(Self { pool })
    }
}

/// Builds connect options from either the URL or the discrete fields.
pub fn connect_options(config: &DatabaseConfig) -> CachetResult<PgConnectOptions> {
    if let Some(url) = config.url.as_deref().filter(|u| !u.is_empty()) {
        return PgConnectOptions::from_str(url)
            .map_err(|e| CachetError::Configuration(format!("Invalid database URL: {}", e)));
    }

    let ssl_mode = PgSslMode::from_str(&config.ssl_mode).map_err(|e| {
        CachetError::Configuration(format!("Invalid ssl_mode '{}': {}", config.ssl_mode, e))
    })?;

    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .database(&config.database)
        .ssl_mode(ssl_mode);

    if let Some(password) = config.password.as_deref() {
        options = options.password(password);
    }

    Ok(options)
}

#[async_trait]
impl DatabasePoolInterface for DatabasePool {
    fn inner(&self) -> &PgPool {
        &self.pool
    }

    async fn health_check(&self) -> CachetResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| CachetError::Database(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    async fn close(&self) {
        info!("Closing database connection pool...");
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}

impl std::ops::Deref for DatabasePool {
    type Target = PgPool;

    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("size", &self.pool.size())
            .field("num_idle", &self.pool.num_idle())
            .finish()
    }
}

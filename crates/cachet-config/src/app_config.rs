//! Application configuration structures.

use crate::MissingDeletePolicy;
use cachet_core::{CachetError, CachetResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name and metadata.
    pub app: AppMetadata,
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Relational store connection.
    pub database: DatabaseConfig,
    /// Redis connection.
    pub redis: RedisConfig,
    /// Cached listing behaviour.
    pub cache: CacheConfig,
    /// User write semantics.
    pub users: UsersConfig,
    /// Upload storage and limits.
    pub uploads: UploadsConfig,
    /// Logging configuration.
    pub observability: ObservabilityConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    pub name: String,
    pub version: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "cachet".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
    pub cors_enabled: bool,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout_secs: 30,
            cors_enabled: false,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ServerConfig {
    /// Returns the bind address.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the request timeout as a Duration.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// PostgreSQL connection configuration.
///
/// `url` takes precedence over the discrete fields when set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    /// `disable`, `prefer` or `require`.
    pub ssl_mode: String,
    pub min_connections: u32,
    pub max_connections: u32,
    /// Acquire timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds.
    pub idle_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: None,
            database: "postgres".to_string(),
            ssl_mode: "prefer".to_string(),
            min_connections: 1,
            max_connections: 10,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl DatabaseConfig {
    /// Returns the connect timeout as a Duration.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Returns the idle timeout as a Duration.
    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

/// Redis connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Full URL; overrides host/port/password when set.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    /// Use `rediss://`.
    pub tls: bool,
    pub pool_size: usize,
    /// Disable to run without a cache; every listing then reads the store.
    pub enabled: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            tls: false,
            pool_size: 10,
            enabled: true,
        }
    }
}

impl RedisConfig {
    /// Builds the connection URL, percent-encoding the password.
    pub fn connection_url(&self) -> CachetResult<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }

        let scheme = if self.tls { "rediss" } else { "redis" };
        let mut url = Url::parse(&format!("{}://{}:{}", scheme, self.host, self.port))
            .map_err(|e| CachetError::Configuration(format!("Invalid Redis address: {}", e)))?;

        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            url.set_password(Some(password)).map_err(|()| {
                CachetError::Configuration("Redis URL cannot carry a password".to_string())
            })?;
        }

        Ok(url.to_string())
    }
}

/// Cached listing behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Expiry for the cached user listing. Unset means the entry lives until
    /// the next write invalidates it.
    pub user_list_ttl_secs: Option<u64>,
}

impl CacheConfig {
    #[must_use]
    pub fn user_list_ttl(&self) -> Option<Duration> {
        self.user_list_ttl_secs.map(Duration::from_secs)
    }
}

/// User write semantics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UsersConfig {
    pub missing_delete: MissingDeletePolicy,
}

/// Upload storage and limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadsConfig {
    /// Directory uploads are written to, relative to the working directory.
    pub directory: String,
    /// Largest accepted file in bytes (inclusive).
    pub max_file_size: u64,
    /// Multipart field carrying the file.
    pub field_name: String,
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            directory: "uploads".to_string(),
            max_file_size: 1_000_000,
            field_name: "myFile".to_string(),
        }
    }
}

impl UploadsConfig {
    #[must_use]
    pub fn directory_path(&self) -> PathBuf {
        PathBuf::from(&self.directory)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
    /// Emit JSON lines instead of the human format.
    pub json_logs: bool,
}

//! Configuration loader with layered sources.

use crate::AppConfig;
use cachet_core::CachetError;
use config::{Config, ConfigError, Environment, File};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Plain variables honoured for compatibility with the original deployment,
/// mapped to their configuration keys. Applied last, so they win.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("PG_HOST", "database.host"),
    ("PG_PORT", "database.port"),
    ("PG_USER", "database.user"),
    ("PG_PASSWORD", "database.password"),
    ("PG_DATABASE", "database.database"),
    ("REDIS_HOST", "redis.host"),
    ("REDIS_PORT", "redis.port"),
    ("REDIS_PASSWORD", "redis.password"),
];

/// Configuration loader.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: AppConfig,
    config_dir: String,
}

impl ConfigLoader {
    /// Loads configuration from `config_dir` and the process environment.
    ///
    /// Sources, lowest precedence first:
    /// 1. `{config_dir}/default.toml`
    /// 2. `{config_dir}/{environment}.toml` (`CACHET_ENVIRONMENT`, default `development`)
    /// 3. `{config_dir}/local.toml`
    /// 4. `CACHET__SECTION__KEY` environment variables
    /// 5. `PORT`, `PG_*`, `REDIS_*`
    pub fn new(config_dir: impl Into<String>) -> Result<Self, CachetError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let env: HashMap<String, String> = std::env::vars().collect();
        Self::with_env(config_dir, env)
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, CachetError> {
        Self::new("./config")
    }

    /// Loads configuration against an explicit environment map instead of
    /// the process environment.
    pub fn with_env(
        config_dir: impl Into<String>,
        env: HashMap<String, String>,
    ) -> Result<Self, CachetError> {
        let config_dir = config_dir.into();
        let config = load_config(&config_dir, env)?;
        Ok(Self { config, config_dir })
    }

    /// Returns the loaded configuration.
    #[must_use]
    pub fn get(&self) -> &AppConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    #[must_use]
    pub fn into_config(self) -> AppConfig {
        self.config
    }

    /// Directory the files were read from.
    #[must_use]
    pub fn config_dir(&self) -> &str {
        &self.config_dir
    }
}

fn load_config(config_dir: &str, env: HashMap<String, String>) -> Result<AppConfig, CachetError> {
    let environment = env
        .get("CACHET_ENVIRONMENT")
        .cloned()
        .unwrap_or_else(|| "development".to_string());

    info!("Loading configuration for environment: {}", environment);

    let mut builder = Config::builder();

    for name in ["default", environment.as_str(), "local"] {
        let path = format!("{}/{}.toml", config_dir, name);
        if Path::new(&path).exists() {
            debug!("Loading config from: {}", path);
            builder = builder.add_source(File::with_name(&path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("CACHET")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(Some(env.clone().into_iter().collect())),
    );

    for (var, key) in LEGACY_ENV {
        if let Some(value) = env.get(*var).filter(|v| !v.is_empty()) {
            debug!("Applying {} to {}", var, key);
            builder = builder
                .set_override(*key, value.clone())
                .map_err(config_error_to_cachet_error)?;
        }
    }

    let mut app_config: AppConfig = builder
        .build()
        .and_then(|c| c.try_deserialize::<AppConfig>())
        .map_err(config_error_to_cachet_error)?;

    app_config.app.environment = environment;
    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validates the configuration.
fn validate_config(config: &AppConfig) -> Result<(), CachetError> {
    let db = &config.database;
    if db.url.as_deref().map_or(true, str::is_empty) {
        if db.host.is_empty() {
            return Err(CachetError::Configuration("Database host is required".to_string()));
        }
        if db.database.is_empty() {
            return Err(CachetError::Configuration("Database name is required".to_string()));
        }
    }

    if db.max_connections == 0 {
        return Err(CachetError::Configuration(
            "database.max_connections must be at least 1".to_string(),
        ));
    }

    if config.uploads.max_file_size == 0 {
        return Err(CachetError::Configuration(
            "uploads.max_file_size must be greater than zero".to_string(),
        ));
    }

    if config.uploads.directory.is_empty() || config.uploads.field_name.is_empty() {
        return Err(CachetError::Configuration(
            "uploads.directory and uploads.field_name are required".to_string(),
        ));
    }

    if config.app.environment == "production"
        && config.database.password.is_none()
        && config.database.url.is_none()
    {
        warn!("No database password configured in production");
    }

    Ok(())
}

fn config_error_to_cachet_error(err: ConfigError) -> CachetError {
    CachetError::Configuration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MissingDeletePolicy;
    use std::fs;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_missing_directory_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::with_env(dir.path().to_string_lossy(), env(&[])).unwrap();
        let config = loader.get();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.app.environment, "development");
    }

    #[test]
    fn test_files_are_layered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("default.toml"),
            "[server]\nport = 8080\n[uploads]\ndirectory = \"files\"\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("staging.toml"),
            "[server]\nport = 9090\n[users]\nmissing_delete = \"not_found\"\n",
        )
        .unwrap();

        let loader = ConfigLoader::with_env(
            dir.path().to_string_lossy(),
            env(&[("CACHET_ENVIRONMENT", "staging")]),
        )
        .unwrap();
        let config = loader.get();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.uploads.directory, "files");
        assert_eq!(config.users.missing_delete, MissingDeletePolicy::NotFound);
        assert_eq!(config.app.environment, "staging");
    }

    #[test]
    fn test_prefixed_env_overrides_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[redis]\nenabled = true\n").unwrap();

        let loader = ConfigLoader::with_env(
            dir.path().to_string_lossy(),
            env(&[
                ("CACHET__REDIS__ENABLED", "false"),
                ("CACHET__CACHE__USER_LIST_TTL_SECS", "60"),
            ]),
        )
        .unwrap();

        assert!(!loader.get().redis.enabled);
        assert_eq!(loader.get().cache.user_list_ttl_secs, Some(60));
    }

    #[test]
    fn test_legacy_variables_are_honoured() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ConfigLoader::with_env(
            dir.path().to_string_lossy(),
            env(&[
                ("PORT", "4000"),
                ("PG_HOST", "db.internal"),
                ("PG_PORT", "6543"),
                ("PG_USER", "app"),
                ("PG_PASSWORD", "secret"),
                ("PG_DATABASE", "users"),
                ("REDIS_HOST", "cache.internal"),
                ("REDIS_PORT", "6380"),
            ]),
        )
        .unwrap();
        let config = loader.into_config();

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.user, "app");
        assert_eq!(config.database.password.as_deref(), Some("secret"));
        assert_eq!(config.database.database, "users");
        assert_eq!(config.redis.host, "cache.internal");
        assert_eq!(config.redis.port, 6380);
    }

    #[test]
    fn test_zero_upload_limit_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("default.toml"), "[uploads]\nmax_file_size = 0\n").unwrap();

        let err = ConfigLoader::with_env(dir.path().to_string_lossy(), env(&[])).unwrap_err();
        assert!(matches!(err, CachetError::Configuration(_)));
    }

    #[test]
    fn test_shipped_config_files_parse() {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config");

        let development = ConfigLoader::with_env(dir, env(&[])).unwrap().into_config();
        assert_eq!(development.uploads.field_name, "myFile");
        assert_eq!(development.uploads.max_file_size, 1_000_000);
        assert!(!development.observability.json_logs);

        let production =
            ConfigLoader::with_env(dir, env(&[("CACHET_ENVIRONMENT", "production")]))
                .unwrap()
                .into_config();
        assert_eq!(production.database.ssl_mode, "require");
        assert!(production.observability.json_logs);
    }
}

//! Server startup utilities.

use cachet_config::AppConfig;
use tracing::info;

/// Prints server startup information.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    let addr = config.server.addr();
    info!("{}", separator);
    info!("Users:     http://{}/", addr);
    info!("JSON:      http://{}/json", addr);
    info!("Upload:    http://{}/upload (field '{}', max {} bytes)",
        addr, config.uploads.field_name, config.uploads.max_file_size);
    info!("Health:    http://{}/health", addr);
    info!("Cache:     {}", cache_summary(config));
    info!("{}", separator);
}

fn cache_summary(config: &AppConfig) -> String {
    if !config.redis.enabled {
        return "disabled".to_string();
    }
    match config.cache.user_list_ttl_secs {
        Some(secs) => format!("redis {}:{} (ttl {}s)", config.redis.host, config.redis.port, secs),
        None => format!("redis {}:{}", config.redis.host, config.redis.port),
    }
}

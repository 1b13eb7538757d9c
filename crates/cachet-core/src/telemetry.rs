//! Logging bootstrap.
//!
//! `RUST_LOG` wins over the configured default directive. JSON output is
//! meant for log shippers, the plain format for terminals.

#[cfg(feature = "telemetry")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither `RUST_LOG` nor configuration provides one.
pub const DEFAULT_LOG_FILTER: &str = "info,cachet=debug,tower_http=debug";

/// Installs the global tracing subscriber.
///
/// Calling this twice is harmless; the second installation is ignored.
#[cfg(feature = "telemetry")]
pub fn init_logging(default_filter: Option<&str>, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter.unwrap_or(DEFAULT_LOG_FILTER)));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Placeholder for when the telemetry feature is disabled.
#[cfg(not(feature = "telemetry"))]
pub fn init_logging(_default_filter: Option<&str>, _json: bool) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice_does_not_panic() {
        init_logging(None, false);
        init_logging(Some("debug"), true);
    }
}

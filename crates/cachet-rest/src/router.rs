//! Main application router.

use crate::{
    controllers::{health_controller, index_controller, upload_controller, user_controller},
    middleware::logging_middleware,
    responses::AppError,
    state::AppState,
};
use axum::{
    http::{HeaderValue, StatusCode, Uri},
    middleware, Router,
};
use cachet_config::ServerConfig;
use cachet_core::CachetError;
use cachet_service::{UploadGateway, UserGateway};
use shaku::{HasComponent, Module};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

/// Creates the application router from a Shaku module.
pub fn create_router<M>(module: &M, server_config: &ServerConfig, upload_dir_label: &str) -> Router
where
    M: Module + HasComponent<dyn UserGateway> + HasComponent<dyn UploadGateway>,
{
    let state = AppState::from_module(module, upload_dir_label);
    create_router_with_state(state, server_config)
}

/// Creates the application router around an existing state.
pub fn create_router_with_state(state: AppState, server_config: &ServerConfig) -> Router {
    let cors = create_cors_layer(server_config);
    let max_file_size = state.upload_gateway.limits().max_file_size;

    let router = Router::new()
        .merge(health_controller::router())
        .merge(index_controller::router())
        .merge(user_controller::router())
        .merge(upload_controller::router(max_file_size))
        .fallback(fallback)
        .with_state(state)
        .layer(create_timeout_layer(server_config))
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(middleware::from_fn(logging_middleware));

    info!("Router created");
    router
}

/// Requests that outlive the configured timeout get a bare 408.
fn create_timeout_layer(server_config: &ServerConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, server_config.request_timeout())
}

/// Creates a CORS layer based on server configuration.
fn create_cors_layer(server_config: &ServerConfig) -> CorsLayer {
    if !server_config.cors_enabled {
        return CorsLayer::new();
    }

    if server_config.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server_config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn fallback(uri: Uri) -> AppError {
    CachetError::not_found("Route", uri.path()).into()
}

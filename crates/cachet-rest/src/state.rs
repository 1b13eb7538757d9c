//! Application state for Axum handlers.

use cachet_service::{UploadGateway, UserGateway};
use shaku::{HasComponent, Module};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub user_gateway: Arc<dyn UserGateway>,
    pub upload_gateway: Arc<dyn UploadGateway>,
    /// Upload directory as shown to clients (`uploads/<name>`).
    pub upload_dir_label: Arc<str>,
}

impl AppState {
    pub fn new(
        user_gateway: Arc<dyn UserGateway>,
        upload_gateway: Arc<dyn UploadGateway>,
        upload_dir_label: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            user_gateway,
            upload_gateway,
            upload_dir_label: upload_dir_label.into(),
        }
    }

    /// Resolves the gateways from a Shaku module.
    pub fn from_module<M>(module: &M, upload_dir_label: impl Into<Arc<str>>) -> Self
    where
        M: Module + HasComponent<dyn UserGateway> + HasComponent<dyn UploadGateway>,
    {
        let user_gateway: Arc<dyn UserGateway> = module.resolve();
        let upload_gateway: Arc<dyn UploadGateway> = module.resolve();
        Self::new(user_gateway, upload_gateway, upload_dir_label)
    }
}

//! API response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cachet_core::{field_errors, CachetError, ErrorResponse};
use serde::{Deserialize, Serialize};
use tracing::error;
use validator::ValidationErrors;

/// Body of every API error: `{ "success": false, "error": { .. } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorResponse,
}

impl ErrorEnvelope {
    #[must_use]
    pub fn new(error: ErrorResponse) -> Self {
        Self {
            success: false,
            error,
        }
    }
}

/// Application error type for Axum.
///
/// Backend failures are logged here and reach the client only as
/// "Internal server error".
#[derive(Debug)]
pub struct AppError {
    pub error: CachetError,
    details: Option<ErrorResponse>,
}

impl AppError {
    /// A validation failure carrying per-field details.
    #[must_use]
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        let error = cachet_core::validation_errors_to_cachet_error(errors.clone());
        let details = ErrorResponse::from_error(&error).with_details(field_errors(errors));
        Self {
            error,
            details: Some(details),
        }
    }
}

impl From<CachetError> for AppError {
    fn from(error: CachetError) -> Self {
        Self {
            error,
            details: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!("Request failed: {}", self.error);
        }

        let error_response = self
            .details
            .unwrap_or_else(|| ErrorResponse::from_error(&self.error));
        let body = Json(ErrorEnvelope::new(error_response));

        (status, body).into_response()
    }
}

/// Result type for Axum handlers.
pub type ApiResult<T> = Result<Json<T>, AppError>;

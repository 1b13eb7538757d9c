//! Body extractor accepting either a urlencoded form or JSON.
//!
//! The HTML page posts forms while API clients send JSON; both decode into
//! the same request type and are validated the same way.

use crate::responses::AppError;
use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use cachet_core::CachetError;
use serde::de::DeserializeOwned;
use validator::Validate;

/// Form-or-JSON extractor that validates the decoded value.
///
/// Undecodable bodies and validation failures are both 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedBody<T>(pub T);

fn is_json(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedBody<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let value = if is_json(&req) {
            Json::<T>::from_request(req, state)
                .await
                .map(|Json(value)| value)
                .map_err(|e| CachetError::validation(e.body_text()))?
        } else {
            Form::<T>::from_request(req, state)
                .await
                .map(|Form(value)| value)
                .map_err(|e| CachetError::validation(e.body_text()))?
        };

        value
            .validate()
            .map_err(|errors| AppError::from_validation(&errors))?;

        Ok(Self(value))
    }
}

//! User controller: the JSON listing and the create/delete form targets.

use crate::{
    extractors::ValidatedBody,
    responses::{ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use cachet_core::UserId;
use cachet_service::{CreateUserRequest, Invalidation, UserListResponse};
use tracing::{debug, error};

/// Creates the user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/json", get(list_users))
        .route("/users", post(create_user))
        .route("/users/delete/:id", post(delete_user))
}

/// Full listing with the source it was served from.
async fn list_users(State(state): State<AppState>) -> ApiResult<UserListResponse> {
    let list = state.user_gateway.list().await?;
    debug!("Listed {} users from {}", list.users.len(), list.source);
    Ok(Json(list.into()))
}

/// Create a user and go back to the index.
async fn create_user(
    State(state): State<AppState>,
    ValidatedBody(request): ValidatedBody<CreateUserRequest>,
) -> Result<Redirect, AppError> {
    let (user, invalidation) = state.user_gateway.create(request.into()).await?.into_parts();
    report_invalidation("POST /users", &invalidation);
    debug!("Created user {}", user.id);
    Ok(Redirect::to("/"))
}

/// Delete a user and go back to the index.
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let user_id = UserId::parse(&id)?;
    let (_, invalidation) = state.user_gateway.delete(user_id).await?.into_parts();
    report_invalidation("POST /users/delete/:id", &invalidation);
    Ok(Redirect::to("/"))
}

fn report_invalidation(route: &str, invalidation: &Invalidation) {
    if let Invalidation::Failed(reason) = invalidation {
        error!(
            route = %route,
            "Write succeeded but the cached user list was not invalidated: {}",
            reason
        );
    }
}

//! User-related DTOs.

use cachet_core::{ListSource, NewUser, UserList, UserRecord};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to create a user, from a form post or a JSON body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "name cannot exceed 255 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 255, message = "email cannot exceed 255 characters"))]
    pub email: String,
}

impl From<CreateUserRequest> for NewUser {
    fn from(request: CreateUserRequest) -> Self {
        Self::new(request.name.trim(), request.email.trim())
    }
}

/// Body of `GET /json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<UserRecord>,
    pub source: ListSource,
}

impl From<UserList> for UserListResponse {
    fn from(list: UserList) -> Self {
        Self {
            users: list.users,
            source: list.source,
        }
    }
}

//! User records and the cached listing.

use crate::UserId;
use crate::validation::rules;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A persisted user.
///
/// Created by the store on insert and never mutated afterwards; the only
/// other lifecycle event is delete-by-id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// Input for creating a user. The id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewUser {
    #[validate(custom(function = "rules::not_blank", message = "name must not be blank"))]
    pub name: String,

    #[validate(custom(function = "rules::not_blank", message = "email must not be blank"))]
    pub email: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Where a user listing was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListSource {
    /// The cached projection.
    #[serde(rename = "Redis")]
    Cache,
    /// The relational store, after a cache miss.
    #[serde(rename = "PostgreSQL")]
    Store,
}

impl ListSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "Redis",
            Self::Store => "PostgreSQL",
        }
    }
}

impl std::fmt::Display for ListSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full user listing tagged with its source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserList {
    pub users: Vec<UserRecord>,
    pub source: ListSource,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidateExt;

    #[test]
    fn test_record_json_shape() {
        let record = UserRecord {
            id: UserId(3),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "id": 3, "name": "Ada", "email": "ada@example.com" })
        );
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(serde_json::to_string(&ListSource::Cache).unwrap(), "\"Redis\"");
        assert_eq!(serde_json::to_string(&ListSource::Store).unwrap(), "\"PostgreSQL\"");
        assert_eq!(ListSource::Store.to_string(), "PostgreSQL");
    }

    #[test]
    fn test_new_user_requires_both_fields() {
        assert!(NewUser::new("Ada", "ada@example.com").validate_request().is_ok());

        let err = NewUser::new("", "ada@example.com").validate_request().unwrap_err();
        assert!(err.to_string().contains("name must not be blank"));

        let err = NewUser::new("Ada", "  ").validate_request().unwrap_err();
        assert!(err.to_string().contains("email must not be blank"));
    }
}

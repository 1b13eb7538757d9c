//! Typed ID wrappers for domain entities.

use crate::CachetError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// A strongly-typed wrapper for store-assigned user IDs.
///
/// The relational store hands these out on insert (`SERIAL`); callers never
/// choose one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i32);

impl UserId {
    /// Wraps a raw id as read from the store.
    #[must_use]
    pub const fn from_raw(id: i32) -> Self {
        Self(id)
    }

    /// Parses a user ID from a path segment.
    pub fn parse(s: &str) -> Result<Self, CachetError> {
        s.trim()
            .parse::<i32>()
            .map(Self)
            .map_err(|_| CachetError::validation(format!("Invalid user id: {}", s)))
    }

    /// Returns the inner integer.
    #[must_use]
    pub const fn into_inner(self) -> i32 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = CachetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<UserId> for i32 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_id() {
        assert_eq!(UserId::parse("42").unwrap(), UserId(42));
        assert_eq!(" 7 ".parse::<UserId>().unwrap(), UserId(7));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = UserId::parse("abc").unwrap_err();
        assert!(err.is_validation());
        assert!(UserId::parse("").is_err());
        assert!(UserId::parse("99999999999").is_err());
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&UserId(5)).unwrap();
        assert_eq!(json, "5");
        let id: UserId = serde_json::from_str("12").unwrap();
        assert_eq!(id.into_inner(), 12);
    }
}

//! Behavioural switches that are configuration choices rather than code.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What deleting an id that matches no row should report.
///
/// Both policies invalidate the cached listing first; they differ only in
/// the result handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingDeletePolicy {
    /// Treat as success. Deletes are idempotent and safe to retry.
    #[default]
    Ignore,
    /// Report `NotFound`.
    NotFound,
}

impl fmt::Display for MissingDeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ignore => write!(f, "ignore"),
            Self::NotFound => write!(f, "not_found"),
        }
    }
}

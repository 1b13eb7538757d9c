//! Cache key names.
//!
//! Keys are not namespaced so a deployment that already shares the Redis
//! instance keeps hitting the same entry.

/// The single entry holding the full user listing.
pub const USER_LIST: &str = "users";

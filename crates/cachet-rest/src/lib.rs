//! # Cachet REST
//!
//! HTTP surface for Cachet using Axum: the user listing (HTML and JSON),
//! user create/delete forms, file upload and download, and health checks.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;

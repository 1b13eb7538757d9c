//! # Cachet Core
//!
//! Core types, error taxonomy and domain model shared by every Cachet crate.
//! Nothing in here talks to a backend; the storage, cache and HTTP crates
//! build on these definitions.

pub mod domain;
pub mod error;
pub mod id;
pub mod result;
pub mod telemetry;
pub mod validation;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use result::*;
pub use validation::*;

// Re-export shaku for dependency injection
pub use shaku::{module, HasComponent, Interface};

//! # Cachet Server Library
//!
//! Dependency injection wiring and startup helpers for the `cachet` binary.

pub mod di;
pub mod startup;

//! # Cachet Config
//!
//! Configuration management for Cachet.
//! Layered sources: TOML files, `CACHET__` environment variables, and the
//! plain `PG_*` / `REDIS_*` / `PORT` variables older deployments set.

mod app_config;
mod loader;
mod policy;

pub use app_config::*;
pub use loader::*;
pub use policy::*;

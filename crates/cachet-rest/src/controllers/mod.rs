//! HTTP controllers.

pub mod health_controller;
pub mod index_controller;
pub mod upload_controller;
pub mod user_controller;

pub use health_controller::*;

//! Gateway implementations.
//!
//! Trait definitions live in the parent module (`user_gateway.rs`,
//! `upload_gateway.rs`).

pub mod upload_gateway_impl;
pub mod user_gateway_impl;

pub use upload_gateway_impl::{FileUploadGateway, FileUploadGatewayParameters};
pub use user_gateway_impl::{UserCacheGateway, UserCacheGatewayParameters};

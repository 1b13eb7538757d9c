//! # Cachet Service
//!
//! The two gateways the HTTP layer talks to:
//!
//! - [`UserGateway`]: cache-aside listing of users over the record store,
//!   with the cached list invalidated after every write.
//! - [`UploadGateway`]: validated, collision-free file uploads and downloads
//!   over the blob store.

pub mod cache;
pub mod dto;
pub mod r#impl;
pub mod upload_gateway;
pub mod user_gateway;

pub use cache::*;
pub use dto::*;
pub use r#impl::*;
pub use upload_gateway::*;
pub use user_gateway::*;

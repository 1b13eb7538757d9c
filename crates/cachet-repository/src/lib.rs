//! # Cachet Repository
//!
//! The two durable backends behind the gateways:
//!
//! ```text
//! UserCacheGateway ──► Arc<dyn UserStore> ──► PgUserStore ──► DatabasePool ──► PostgreSQL
//! UploadGateway    ──► Arc<dyn BlobStore> ──► FilesystemBlobStore ──► uploads/
//! ```
//!
//! Both are treated as correct, opaque backends: the gateways add no locking
//! and no retries on top of them.

pub mod blob;
pub mod pool;
pub mod postgres;
pub mod traits;

#[cfg(any(test, feature = "testing"))]
pub mod memory;

pub use blob::{
    BlobReader, BlobStore, ByteStream, FilesystemBlobStore, FilesystemBlobStoreParameters,
};
pub use pool::*;
pub use postgres::{PgUserStore, PgUserStoreParameters};
pub use traits::*;

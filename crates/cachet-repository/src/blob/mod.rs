//! Blob storage for uploaded files.

mod filesystem;

pub use filesystem::*;

use async_trait::async_trait;
use bytes::Bytes;
use cachet_core::{CachetError, CachetResult, Interface};
use futures::Stream;
use std::path::{Component, Path};
use std::pin::Pin;

/// A stream of file chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// An opened blob ready to be streamed out.
pub struct BlobReader {
    pub stream: ByteStream,
    pub size: u64,
}

impl std::fmt::Debug for BlobReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobReader").field("size", &self.size).finish_non_exhaustive()
    }
}

/// Flat, named blob storage.
///
/// Names are single path components. A published blob is always complete:
/// readers never observe a partially written file.
#[async_trait]
pub trait BlobStore: Interface + Send + Sync {
    /// Publishes `data` under `name`.
    ///
    /// Never overwrites: fails with [`CachetError::Conflict`] when the name
    /// is already taken.
    async fn put_new(&self, name: &str, data: Bytes) -> CachetResult<()>;

    /// Opens a blob for streaming. Unknown or unsafe names are `NotFound`.
    async fn open(&self, name: &str) -> CachetResult<BlobReader>;

    /// Lists published blob names, sorted.
    async fn list(&self) -> CachetResult<Vec<String>>;
}

/// Checks that `name` is a single, visible path component.
pub fn validate_name(name: &str) -> CachetResult<()> {
    let invalid = || CachetError::validation(format!("invalid file name: {name:?}"));

    if name.is_empty()
        || name.starts_with('.')
        || name.contains("..")
        || name.contains(&['/', '\\', '\0'][..])
    {
        return Err(invalid());
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid()),
    }
}

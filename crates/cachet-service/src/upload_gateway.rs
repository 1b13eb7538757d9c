//! Upload gateway trait definition.

use async_trait::async_trait;
use bytes::Bytes;
use cachet_core::{CachetResult, Interface, UploadedAsset};
use cachet_repository::ByteStream;

/// Limits applied to every upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadLimits {
    /// Largest accepted size in bytes (inclusive).
    pub max_file_size: u64,
    /// Multipart field carrying the file; also the stored-name prefix.
    pub field_name: String,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: 1_000_000,
            field_name: "myFile".to_string(),
        }
    }
}

impl From<&cachet_config::UploadsConfig> for UploadLimits {
    fn from(config: &cachet_config::UploadsConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            field_name: config.field_name.clone(),
        }
    }
}

/// A file as received from the client, not yet validated.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub field_name: String,
    /// Name declared by the client.
    pub original_name: String,
    /// MIME type declared by the client.
    pub content_type: String,
    pub bytes: Bytes,
}

/// A stored file ready to be streamed back.
pub struct Download {
    pub file_name: String,
    pub content_type: &'static str,
    pub size: u64,
    pub stream: ByteStream,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Validated upload and download of files.
#[async_trait]
pub trait UploadGateway: Interface + Send + Sync {
    /// The limits uploads are checked against.
    fn limits(&self) -> &UploadLimits;

    /// Validates type and size, then stores the file under a fresh name.
    ///
    /// Nothing is written when validation fails.
    async fn upload(&self, file: IncomingFile) -> CachetResult<UploadedAsset>;

    /// Opens a stored file. Unknown names are `NotFound`.
    async fn download(&self, stored_name: &str) -> CachetResult<Download>;

    /// Names of all stored files, sorted.
    async fn list_files(&self) -> CachetResult<Vec<String>>;
}

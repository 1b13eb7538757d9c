//! File upload gateway.

use crate::upload_gateway::{Download, IncomingFile, UploadGateway, UploadLimits};
use async_trait::async_trait;
use cachet_core::{extension_of, CachetError, CachetResult, FileKind, UploadedAsset};
use cachet_repository::BlobStore;
use chrono::Utc;
use shaku::Component;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fallback content type for stored files of unknown kind.
const OCTET_STREAM: &str = "application/octet-stream";

/// Attempts at finding a free stored name before giving up.
const MAX_NAME_ATTEMPTS: i64 = 16;

/// Upload gateway over a [`BlobStore`].
#[derive(Component)]
#[shaku(interface = UploadGateway)]
pub struct FileUploadGateway {
    #[shaku(inject)]
    blobs: Arc<dyn BlobStore>,
    limits: UploadLimits,
}

impl FileUploadGateway {
    #[must_use]
    pub fn new(blobs: Arc<dyn BlobStore>, limits: UploadLimits) -> Self {
        Self { blobs, limits }
    }

    /// Both the extension and the declared MIME type must be on the
    /// allow-list, and they must name the same kind.
    fn check_type(file: &IncomingFile) -> CachetResult<FileKind> {
        let by_extension = FileKind::from_extension(extension_of(&file.original_name));
        let by_mime = FileKind::from_mime(&file.content_type);

        match (by_extension, by_mime) {
            (Some(ext), Some(mime)) if ext == mime => Ok(ext),
            _ => Err(CachetError::UnsupportedType(format!(
                "Images and PDFs only, got '{}' as '{}'",
                file.original_name, file.content_type
            ))),
        }
    }
}

#[async_trait]
impl UploadGateway for FileUploadGateway {
    fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    async fn upload(&self, file: IncomingFile) -> CachetResult<UploadedAsset> {
        if file.field_name != self.limits.field_name {
            return Err(CachetError::validation(format!(
                "Unexpected field '{}'",
                file.field_name
            )));
        }

        let kind = Self::check_type(&file)?;

        let size = file.bytes.len() as u64;
        if size > self.limits.max_file_size {
            return Err(CachetError::TooLarge {
                size,
                limit: self.limits.max_file_size,
            });
        }

        let extension = extension_of(&file.original_name);
        let mut millis = Utc::now().timestamp_millis();

        for _ in 0..MAX_NAME_ATTEMPTS {
            let stored_name = format!("{}-{}{}", file.field_name, millis, extension);

            match self.blobs.put_new(&stored_name, file.bytes.clone()).await {
                Ok(()) => {
                    info!(
                        "Stored upload '{}' as {} ({} bytes, {:?})",
                        file.original_name, stored_name, size, kind
                    );
                    return Ok(UploadedAsset {
                        stored_name,
                        original_name: file.original_name,
                        size_bytes: size,
                        mime_type: file.content_type,
                    });
                }
                Err(CachetError::Conflict(_)) => {
                    debug!("Stored name {} taken, retrying", stored_name);
                    millis += 1;
                }
                Err(e) => return Err(e),
            }
        }

        warn!("No free stored name for '{}'", file.original_name);
        Err(CachetError::Storage(
            "could not allocate a unique file name".to_string(),
        ))
    }

    async fn download(&self, stored_name: &str) -> CachetResult<Download> {
        let reader = self.blobs.open(stored_name).await?;
        let content_type = FileKind::from_extension(extension_of(stored_name))
            .map_or(OCTET_STREAM, FileKind::content_type);

        debug!("Serving {} ({} bytes)", stored_name, reader.size);
        Ok(Download {
            file_name: stored_name.to_string(),
            content_type,
            size: reader.size,
            stream: reader.stream,
        })
    }

    async fn list_files(&self) -> CachetResult<Vec<String>> {
        self.blobs.list().await
    }
}

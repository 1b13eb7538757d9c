//! Upload directory on the local filesystem.

use super::{validate_name, BlobReader, BlobStore};
use async_trait::async_trait;
use bytes::Bytes;
use cachet_core::{CachetError, CachetResult};
use shaku::Component;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Chunk size for streaming reads (64 KiB).
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Blob store backed by a single flat directory.
///
/// Writes go to a hidden temp file which is fsynced and then hard-linked
/// to its final name. Linking fails if the name exists, so a published file
/// is never replaced and never visible half-written.
#[derive(Component, Debug, Clone)]
#[shaku(interface = BlobStore)]
pub struct FilesystemBlobStore {
    root: PathBuf,
}

impl FilesystemBlobStore {
    /// Opens the store, creating `root` if needed.
    pub async fn new(root: impl AsRef<Path>) -> CachetResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.root.join(format!(".{}.tmp.{}", name, Uuid::new_v4()))
    }

    async fn write_temp(path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(path).await?;
        file.write_all(data).await?;
        file.sync_all().await
    }
}

#[async_trait]
impl BlobStore for FilesystemBlobStore {
    #[instrument(skip(self, data), fields(backend = "filesystem", size = data.len()))]
    async fn put_new(&self, name: &str, data: Bytes) -> CachetResult<()> {
        validate_name(name)?;
        let path = self.root.join(name);
        let temp = self.temp_path(name);

        if let Err(e) = Self::write_temp(&temp, &data).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        let linked = fs::hard_link(&temp, &path).await;
        if let Err(e) = fs::remove_file(&temp).await {
            warn!("Failed to remove temp file {}: {}", temp.display(), e);
        }

        match linked {
            Ok(()) => {
                debug!("Stored {}", name);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(CachetError::Conflict(format!("file already exists: {name}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn open(&self, name: &str) -> CachetResult<BlobReader> {
        if let Err(e) = validate_name(name) {
            warn!("Rejected download name: {}", e);
            return Err(CachetError::not_found("File", name));
        }

        let path = self.root.join(name);
        let not_found = |e: std::io::Error| {
            if e.kind() == ErrorKind::NotFound {
                CachetError::not_found("File", name)
            } else {
                e.into()
            }
        };

        let metadata = fs::metadata(&path).await.map_err(not_found)?;
        if !metadata.is_file() {
            return Err(CachetError::not_found("File", name));
        }
        let file = fs::File::open(&path).await.map_err(not_found)?;

        let stream = futures::stream::try_unfold(file, |mut file| async move {
            let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
            let n = file.read(&mut buf).await?;
            if n == 0 {
                return Ok(None);
            }
            buf.truncate(n);
            Ok::<_, std::io::Error>(Some((Bytes::from(buf), file)))
        });

        Ok(BlobReader {
            stream: Box::pin(stream),
            size: metadata.len(),
        })
    }

    async fn list(&self) -> CachetResult<Vec<String>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                if !name.starts_with('.') {
                    names.push(name);
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;

    async fn read_all(reader: BlobReader) -> Vec<u8> {
        let chunks: Vec<Bytes> = reader.stream.try_collect().await.unwrap();
        chunks.concat()
    }

    #[tokio::test]
    async fn test_put_then_open_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path()).await.unwrap();

        store
            .put_new("myFile-1.png", Bytes::from_static(b"\x89PNG data"))
            .await
            .unwrap();

        let reader = store.open("myFile-1.png").await.unwrap();
        assert_eq!(reader.size, 9);
        assert_eq!(read_all(reader).await, b"\x89PNG data");
    }

    #[tokio::test]
    async fn test_large_file_streams_in_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path()).await.unwrap();
        let data = vec![7u8; STREAM_CHUNK_SIZE * 2 + 10];

        store.put_new("big.pdf", Bytes::from(data.clone())).await.unwrap();

        let reader = store.open("big.pdf").await.unwrap();
        let chunks: Vec<Bytes> = reader.stream.try_collect().await.unwrap();
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.len() <= STREAM_CHUNK_SIZE));
        assert_eq!(chunks.concat(), data);
    }

    #[tokio::test]
    async fn test_put_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path()).await.unwrap();

        store.put_new("a.gif", Bytes::from_static(b"first")).await.unwrap();
        let err = store
            .put_new("a.gif", Bytes::from_static(b"second"))
            .await
            .unwrap_err();

        assert!(matches!(err, CachetError::Conflict(_)));
        let reader = store.open("a.gif").await.unwrap();
        assert_eq!(read_all(reader).await, b"first");
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path()).await.unwrap();

        store.put_new("a.gif", Bytes::from_static(b"x")).await.unwrap();
        let _ = store.put_new("a.gif", Bytes::from_static(b"y")).await;

        let on_disk: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(on_disk, vec!["a.gif".to_string()]);
    }

    #[tokio::test]
    async fn test_open_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path()).await.unwrap();

        let err = store.open("nope.png").await.unwrap_err();
        assert!(matches!(err, CachetError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_open_rejects_traversal() {
        let root = tempfile::tempdir().unwrap();
        let uploads = root.path().join("uploads");
        std::fs::write(root.path().join("secret.txt"), b"secret").unwrap();
        let store = FilesystemBlobStore::new(&uploads).await.unwrap();

        let err = store.open("../secret.txt").await.unwrap_err();
        assert!(matches!(err, CachetError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_open_directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let store = FilesystemBlobStore::new(dir.path()).await.unwrap();

        assert!(store.open("sub").await.is_err());
    }

    #[tokio::test]
    async fn test_put_rejects_unsafe_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemBlobStore::new(dir.path()).await.unwrap();

        let err = store
            .put_new("../escape.png", Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_list_skips_hidden_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".a.png.tmp.123"), b"partial").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        let store = FilesystemBlobStore::new(dir.path()).await.unwrap();

        store.put_new("b.pdf", Bytes::from_static(b"b")).await.unwrap();
        store.put_new("a.jpg", Bytes::from_static(b"a")).await.unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["a.jpg", "b.pdf"]);
    }
}

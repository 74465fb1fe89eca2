//! Local filesystem blob store.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use stowage_core::error::{AppError, ErrorKind};
use stowage_core::result::AppResult;
use stowage_core::traits::storage::{BlobStore, ByteStream};

/// Blob store backed by a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    /// Root directory for all blobs.
    root: PathBuf,
}

impl LocalBlobStore {
    /// Create a store rooted at `root_path`, creating the directory if needed.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Io,
                format!("Failed to create blob root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// The directory this store writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative blob path inside the root.
    ///
    /// Only plain path segments are accepted, so a key can never reach
    /// outside the root.
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::validation(format!("Invalid blob path: {path}")));
        }
        Ok(self.root.join(relative))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Io,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

/// Map an I/O failure on `path`, reporting a missing blob as `NotFound`.
fn io_error(action: &str, path: &str, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Blob not found: {path}"))
    } else {
        AppError::with_source(ErrorKind::Io, format!("Failed to {action} blob: {path}"), e)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn backend_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn open(&self, path: &str) -> AppResult<ByteStream> {
        let full_path = self.resolve(path)?;
        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| io_error("open", path, e))?;

        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream))
    }

    async fn write_stream(&self, path: &str, mut stream: ByteStream) -> AppResult<u64> {
        let full_path = self.resolve(path)?;
        self.ensure_parent(&full_path).await?;

        let mut file = fs::File::create(&full_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Io, format!("Failed to create blob: {path}"), e)
        })?;

        let mut total_bytes = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| AppError::with_source(ErrorKind::Io, "Stream read error", e))?;
            total_bytes += chunk.len() as u64;
            file.write_all(&chunk)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Io, "Failed to write chunk", e))?;
        }

        file.sync_all()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Io, "Failed to sync blob", e))?;

        debug!(path, bytes = total_bytes, "Wrote blob from stream");
        Ok(total_bytes)
    }

    async fn rename(&self, from: &str, to: &str) -> AppResult<()> {
        let from_path = self.resolve(from)?;
        let to_path = self.resolve(to)?;
        self.ensure_parent(&to_path).await?;

        fs::rename(&from_path, &to_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Io, format!("Failed to rename {from} -> {to}"), e)
        })?;
        debug!(from, to, "Renamed blob");
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Io,
                format!("Failed to delete blob: {path}"),
                e,
            )),
        }
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path)?;
        fs::try_exists(&full_path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Io, format!("Failed to stat blob: {path}"), e)
        })
    }

    async fn create_dir(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        fs::create_dir_all(&full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Io,
                format!("Failed to create directory: {path}"),
                e,
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    async fn store() -> (tempfile::TempDir, LocalBlobStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path()).await.unwrap();
        (dir, store)
    }

    fn chunks(parts: &[&str]) -> ByteStream {
        let items: Vec<Result<Bytes, std::io::Error>> = parts
            .iter()
            .map(|p| Ok(Bytes::from(p.to_string())))
            .collect();
        Box::pin(futures::stream::iter(items))
    }

    async fn read_all(store: &LocalBlobStore, path: &str) -> Vec<u8> {
        let mut stream = store.open(path).await.unwrap();
        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        collected
    }

    #[tokio::test]
    async fn test_write_exists_delete() {
        let (_dir, store) = store().await;

        let written = store
            .write_stream("owner/file.txt", chunks(&["hello world"]))
            .await
            .unwrap();
        assert_eq!(written, 11);
        assert!(store.exists("owner/file.txt").await.unwrap());

        assert!(store.delete("owner/file.txt").await.unwrap());
        assert!(!store.exists("owner/file.txt").await.unwrap());
        assert!(!store.delete("owner/file.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_stream_round_trip() {
        let (_dir, store) = store().await;

        let written = store
            .write_stream("owner/streamed.bin", chunks(&["abc", "def"]))
            .await
            .unwrap();
        assert_eq!(written, 6);
        assert_eq!(read_all(&store, "owner/streamed.bin").await, b"abcdef");
    }

    #[tokio::test]
    async fn test_rename_moves_blob() {
        let (_dir, store) = store().await;

        store
            .write_stream("owner/temp-1-2.txt", chunks(&["content"]))
            .await
            .unwrap();
        store
            .rename("owner/temp-1-2.txt", "owner/notes-abc.txt")
            .await
            .unwrap();

        assert!(!store.exists("owner/temp-1-2.txt").await.unwrap());
        assert_eq!(read_all(&store, "owner/notes-abc.txt").await, b"content");
    }

    #[tokio::test]
    async fn test_missing_blob_is_not_found() {
        let (_dir, store) = store().await;
        let err = store.open("owner/missing.txt").await.err().unwrap();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_rejects_paths_escaping_root() {
        let (_dir, store) = store().await;
        let err = store
            .write_stream("../outside.txt", chunks(&["x"]))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(store.health_check().await.unwrap());
    }
}

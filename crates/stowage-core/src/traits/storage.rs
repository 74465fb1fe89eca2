//! Blob store trait for pluggable byte storage backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading and writing blob contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for blob storage backends.
///
/// Paths are relative, `/`-separated keys derived from a file's identity
/// (see `stowage_storage::layout`). Every method reports failures as
/// [`ErrorKind::Io`](crate::error::ErrorKind::Io), except `open` on a
/// missing blob, which reports `NotFound`.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend type name (e.g., "local").
    fn backend_type(&self) -> &str;

    /// Check whether the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Open a blob for streaming reads.
    async fn open(&self, path: &str) -> AppResult<ByteStream>;

    /// Write a byte stream to a blob and return the number of bytes written.
    async fn write_stream(&self, path: &str, stream: ByteStream) -> AppResult<u64>;

    /// Move a blob to a new path, replacing the destination atomically.
    async fn rename(&self, from: &str, to: &str) -> AppResult<()>;

    /// Delete a blob. Returns `false` if nothing existed at `path`.
    async fn delete(&self, path: &str) -> AppResult<bool>;

    /// Check whether a blob exists.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// Create a directory (and any missing parents).
    async fn create_dir(&self, path: &str) -> AppResult<()>;
}

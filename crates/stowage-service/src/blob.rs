//! Time-bounded access to the blob store.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use stowage_core::error::AppError;
use stowage_core::result::AppResult;
use stowage_core::traits::storage::{BlobStore, ByteStream};

/// Wraps a [`BlobStore`] so that no call can outlive `timeout`.
#[derive(Clone)]
pub struct BoundedBlobs {
    /// The underlying store.
    store: Arc<dyn BlobStore>,
    /// Upper bound for each call.
    timeout: Duration,
}

impl std::fmt::Debug for BoundedBlobs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedBlobs")
            .field("backend", &self.store.backend_type())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BoundedBlobs {
    /// Creates a bounded wrapper.
    pub fn new(store: Arc<dyn BlobStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    async fn bounded<T>(
        &self,
        action: &str,
        path: &str,
        fut: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(AppError::io(format!(
                "Blob {action} on '{path}' timed out after {}s",
                self.timeout.as_secs()
            ))),
        }
    }

    /// Open a blob for streaming reads.
    pub async fn open(&self, path: &str) -> AppResult<ByteStream> {
        self.bounded("open", path, self.store.open(path)).await
    }

    /// Write a stream to a blob.
    pub async fn write_stream(&self, path: &str, stream: ByteStream) -> AppResult<u64> {
        self.bounded("write", path, self.store.write_stream(path, stream))
            .await
    }

    /// Move a blob.
    pub async fn rename(&self, from: &str, to: &str) -> AppResult<()> {
        self.bounded("rename", from, self.store.rename(from, to))
            .await
    }

    /// Delete a blob.
    pub async fn delete(&self, path: &str) -> AppResult<bool> {
        self.bounded("delete", path, self.store.delete(path)).await
    }

    /// Create a directory.
    pub async fn create_dir(&self, path: &str) -> AppResult<()> {
        self.bounded("mkdir", path, self.store.create_dir(path))
            .await
    }

    /// Delete a blob, logging instead of failing.
    ///
    /// Returns `true` only if a blob was actually removed.
    pub async fn discard(&self, path: &str) -> bool {
        match self.delete(path).await {
            Ok(removed) => {
                debug!(path, removed, "Discarded blob");
                removed
            }
            Err(e) => {
                warn!(path, error = %e, "Failed to delete blob; leaving it orphaned");
                false
            }
        }
    }

    /// Check backend reachability.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.bounded("health check", "/", self.store.health_check())
            .await
    }
}

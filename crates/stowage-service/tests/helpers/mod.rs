//! Shared helpers for the service integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use stowage_core::config::StorageConfig;
use stowage_core::error::AppError;
use stowage_core::result::AppResult;
use stowage_core::traits::storage::{BlobStore, ByteStream};
use stowage_core::types::{FolderId, OwnerId};
use stowage_database::MemoryMetadataStore;
use stowage_entity::Folder;
use stowage_service::{IncomingFile, OwnerContext, Stowage, UploadOutcome};
use stowage_storage::LocalBlobStore;

/// Test application: the facade over an in-memory metadata store and a
/// temporary blob directory.
pub struct TestApp {
    /// The facade under test.
    pub stowage: Stowage,
    /// Metadata store, for direct inspection.
    pub store: Arc<MemoryMetadataStore>,
    /// Blob store, for direct inspection.
    pub blobs: Arc<dyn BlobStore>,
    /// Keeps the blob directory alive.
    _dir: tempfile::TempDir,
}

impl TestApp {
    /// Create a test application over a plain local blob store.
    pub async fn new() -> Self {
        Self::with_blobs(|local| Arc::new(local) as Arc<dyn BlobStore>).await
    }

    /// Create a test application whose blob store is built by `wrap`.
    pub async fn with_blobs(wrap: impl FnOnce(LocalBlobStore) -> Arc<dyn BlobStore>) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let local = LocalBlobStore::new(dir.path())
            .await
            .expect("Failed to init blob store");
        let blobs = wrap(local);
        let store = Arc::new(MemoryMetadataStore::new());

        let stowage = Stowage::new(
            store.clone(),
            store.clone(),
            blobs.clone(),
            StorageConfig::default(),
        );

        Self {
            stowage,
            store,
            blobs,
            _dir: dir,
        }
    }

    /// Provision a fresh owner and return its context and root folder.
    pub async fn owner(&self) -> (OwnerContext, Folder) {
        let ctx = OwnerContext::new(OwnerId::new());
        let root = self
            .stowage
            .provision_owner(&ctx)
            .await
            .expect("Failed to provision owner");
        (ctx, root)
    }

    /// Create a subfolder, panicking on failure.
    pub async fn mkdir(&self, ctx: &OwnerContext, parent: FolderId, name: &str) -> Folder {
        self.stowage
            .create_subfolder(ctx, parent, name)
            .await
            .expect("Failed to create folder")
    }

    /// Stage `content` as `name`, ready for a commit.
    pub async fn stage(&self, ctx: &OwnerContext, name: &str, content: &str) -> IncomingFile {
        self.stowage
            .stage_upload(ctx, name, None, byte_stream(content))
            .await
            .expect("Failed to stage upload")
    }

    /// Stage and commit files into `folder`, returning the outcomes.
    pub async fn upload(
        &self,
        ctx: &OwnerContext,
        folder: FolderId,
        files: &[(&str, &str)],
    ) -> Vec<UploadOutcome> {
        let mut incoming = Vec::new();
        for (name, content) in files {
            incoming.push(self.stage(ctx, name, content).await);
        }
        self.stowage
            .commit_upload(ctx, folder, incoming)
            .await
            .expect("Commit failed as a whole")
    }

    /// Read a whole stream into a string.
    pub async fn read_all(mut stream: ByteStream) -> String {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.expect("Stream chunk failed"));
        }
        String::from_utf8(out).expect("Not UTF-8")
    }
}

/// A one-chunk byte stream.
pub fn byte_stream(content: &str) -> ByteStream {
    let chunk: Result<Bytes, std::io::Error> = Ok(Bytes::from(content.to_string()));
    Box::pin(futures::stream::iter(vec![chunk]))
}

/// A blob store that fails selected `rename` and `create_dir` calls.
#[derive(Debug)]
pub struct FailingBlobStore {
    inner: LocalBlobStore,
    renames: AtomicUsize,
    /// 1-based rename call numbers that should fail.
    fail_renames: Vec<usize>,
    /// Number of leading `create_dir` calls that should fail.
    failing_dirs: AtomicUsize,
}

impl FailingBlobStore {
    /// Wrap `inner`, failing the listed rename calls.
    pub fn new(inner: LocalBlobStore, fail_renames: Vec<usize>) -> Self {
        Self {
            inner,
            renames: AtomicUsize::new(0),
            fail_renames,
            failing_dirs: AtomicUsize::new(0),
        }
    }

    /// Also fail the first `count` directory creations.
    pub fn failing_dirs(self, count: usize) -> Self {
        self.failing_dirs.store(count, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl BlobStore for FailingBlobStore {
    fn backend_type(&self) -> &str {
        "failing"
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn open(&self, path: &str) -> AppResult<ByteStream> {
        self.inner.open(path).await
    }

    async fn write_stream(&self, path: &str, stream: ByteStream) -> AppResult<u64> {
        self.inner.write_stream(path, stream).await
    }

    async fn rename(&self, from: &str, to: &str) -> AppResult<()> {
        let call = self.renames.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_renames.contains(&call) {
            return Err(AppError::io(format!("injected rename failure #{call}")));
        }
        self.inner.rename(from, to).await
    }

    async fn delete(&self, path: &str) -> AppResult<bool> {
        self.inner.delete(path).await
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        self.inner.exists(path).await
    }

    async fn create_dir(&self, path: &str) -> AppResult<()> {
        let remaining = self.failing_dirs.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_dirs.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::io(format!("injected mkdir failure on '{path}'")));
        }
        self.inner.create_dir(path).await
    }
}

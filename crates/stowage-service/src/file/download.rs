//! File download: streams a file's blob to its owner.

use std::sync::Arc;

use stowage_core::error::{AppError, ErrorKind};
use stowage_core::result::AppResult;
use stowage_core::traits::storage::ByteStream;
use stowage_core::types::FileId;
use stowage_database::FileStore;
use stowage_entity::File;
use stowage_storage::layout;

use crate::blob::BoundedBlobs;
use crate::context::OwnerContext;

/// Streams file contents.
#[derive(Debug, Clone)]
pub struct DownloadService {
    /// File store.
    files: Arc<dyn FileStore>,
    /// Blob store.
    blobs: BoundedBlobs,
}

/// A file record with an open stream over its bytes.
pub struct FileDownload {
    /// File metadata.
    pub file: File,
    /// File content.
    pub stream: ByteStream,
}

impl std::fmt::Debug for FileDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDownload")
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

impl FileDownload {
    /// MIME type for a Content-Type header.
    pub fn content_type(&self) -> &str {
        &self.file.mime_type
    }

    /// Suggested filename for a Content-Disposition header.
    pub fn filename(&self) -> &str {
        &self.file.name
    }
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(files: Arc<dyn FileStore>, blobs: BoundedBlobs) -> Self {
        Self { files, blobs }
    }

    /// Opens a stream over a file's bytes.
    ///
    /// Fails with `Authorization` if the record points outside the owner's
    /// blob directory.
    pub async fn stream_file(&self, ctx: &OwnerContext, file_id: FileId) -> AppResult<FileDownload> {
        let file = self
            .files
            .find_by_id(ctx.owner_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;

        let owner_prefix = format!("{}/", layout::owner_dir(ctx.owner_id));
        if !file.storage_path.starts_with(&owner_prefix) {
            return Err(AppError::authorization(format!(
                "File {file_id} is stored outside the owner's directory"
            )));
        }

        // The record exists, so a missing blob is a storage fault.
        let stream = self.blobs.open(&file.storage_path).await.map_err(|e| {
            if e.is(ErrorKind::NotFound) {
                AppError::io(format!("Blob for file {file_id} is missing"))
            } else {
                e
            }
        })?;
        Ok(FileDownload { file, stream })
    }
}

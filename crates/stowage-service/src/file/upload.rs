//! Upload commit pipeline.
//!
//! The transport layer stages each incoming file under a collision-proof
//! temporary name (see [`UploadService::stage`]). Committing a staged file
//! inserts its record, renames the blob to `<stem>-<id><ext>`, and patches
//! the record with the final path. A failure after the insert rolls that
//! one file back completely; the rest of the batch carries on.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use stowage_core::error::{AppError, ErrorKind};
use stowage_core::result::AppResult;
use stowage_core::traits::storage::ByteStream;
use stowage_core::types::{FolderId, OwnerId};
use stowage_database::{FileStore, FolderStore};
use stowage_entity::{CommittedFile, CreateFile, File};
use stowage_storage::{layout, mime};

use crate::blob::BoundedBlobs;
use crate::context::OwnerContext;
use crate::validation::validate_name;

/// A file already written to a staging path by the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingFile {
    /// Name the client uploaded the file as.
    pub original_name: String,
    /// Staging path inside the owner's blob directory.
    pub staged_path: String,
    /// Size in bytes as written to the staging path.
    pub size_bytes: u64,
    /// MIME type claimed by the client.
    pub mime_type: String,
}

/// Per-file result of a commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadOutcome {
    /// The file is stored and addressable.
    Committed(CommittedFile),
    /// The file was rolled back.
    Failed {
        /// Name the client uploaded the file as.
        name: String,
        /// Error kind.
        kind: ErrorKind,
        /// Human-readable reason.
        message: String,
    },
}

impl UploadOutcome {
    /// The committed record, if the file succeeded.
    pub fn committed(&self) -> Option<&CommittedFile> {
        match self {
            Self::Committed(file) => Some(file),
            Self::Failed { .. } => None,
        }
    }

    /// Whether the file was committed.
    pub fn is_committed(&self) -> bool {
        self.committed().is_some()
    }
}

/// Stages and commits uploaded files.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// Folder store.
    folders: Arc<dyn FolderStore>,
    /// File store.
    files: Arc<dyn FileStore>,
    /// Blob store.
    blobs: BoundedBlobs,
    /// Largest accepted file.
    max_upload_size_bytes: u64,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        files: Arc<dyn FileStore>,
        blobs: BoundedBlobs,
        max_upload_size_bytes: u64,
    ) -> Self {
        Self {
            folders,
            files,
            blobs,
            max_upload_size_bytes,
        }
    }

    /// Writes an incoming byte stream to a fresh staging path.
    ///
    /// When `mime_type` is absent it is guessed from the file name.
    pub async fn stage(
        &self,
        ctx: &OwnerContext,
        original_name: &str,
        mime_type: Option<&str>,
        stream: ByteStream,
    ) -> AppResult<IncomingFile> {
        let staged_path = layout::staging_path(ctx.owner_id, original_name);
        let size_bytes = match self.blobs.write_stream(&staged_path, stream).await {
            Ok(n) => n,
            Err(e) => {
                self.blobs.discard(&staged_path).await;
                return Err(e);
            }
        };

        Ok(IncomingFile {
            original_name: original_name.to_string(),
            staged_path,
            size_bytes,
            mime_type: mime_type
                .map(str::to_string)
                .unwrap_or_else(|| mime::guess_from_name(original_name)),
        })
    }

    /// Commits a batch of staged files into `folder_id`.
    ///
    /// Returns one outcome per incoming file, in order. Fails as a whole
    /// only when the batch is empty or the folder does not belong to the
    /// caller; in the latter case every staged blob is discarded first.
    pub async fn commit_upload(
        &self,
        ctx: &OwnerContext,
        folder_id: FolderId,
        incoming: Vec<IncomingFile>,
    ) -> AppResult<Vec<UploadOutcome>> {
        if incoming.is_empty() {
            return Err(AppError::validation("No files uploaded"));
        }

        let folder = match self.folders.find_by_id(ctx.owner_id, folder_id).await {
            Ok(Some(folder)) => folder,
            Ok(None) => {
                self.discard_all(ctx.owner_id, &incoming).await;
                return Err(AppError::not_found(format!("Folder {folder_id} not found")));
            }
            Err(e) => {
                self.discard_all(ctx.owner_id, &incoming).await;
                return Err(e);
            }
        };

        let mut outcomes = Vec::with_capacity(incoming.len());
        for file in &incoming {
            match self.commit_one(ctx.owner_id, folder.id, file).await {
                Ok(committed) => outcomes.push(UploadOutcome::Committed(committed)),
                Err(e) => {
                    warn!(
                        owner_id = %ctx.owner_id,
                        folder_id = %folder.id,
                        name = %file.original_name,
                        error = %e,
                        "File upload rolled back"
                    );
                    outcomes.push(UploadOutcome::Failed {
                        name: file.original_name.clone(),
                        kind: e.kind,
                        message: e.message,
                    });
                }
            }
        }

        let committed = outcomes.iter().filter(|o| o.is_committed()).count();
        if committed > 0 {
            if let Err(e) = self.folders.touch(ctx.owner_id, folder.id).await {
                warn!(owner_id = %ctx.owner_id, folder_id = %folder.id, error = %e, "Failed to touch folder");
            }
        }

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder.id,
            committed,
            failed = outcomes.len() - committed,
            "Upload batch committed"
        );
        Ok(outcomes)
    }

    async fn commit_one(
        &self,
        owner_id: OwnerId,
        folder_id: FolderId,
        incoming: &IncomingFile,
    ) -> AppResult<CommittedFile> {
        let staged = incoming.staged_path.as_str();
        if !is_owned_staging_path(owner_id, staged) {
            return Err(AppError::upload(format!(
                "'{staged}' is not a staging path of this owner"
            )));
        }

        let name = match validate_name("File", &incoming.original_name) {
            Ok(name) => name,
            Err(e) => {
                self.blobs.discard(staged).await;
                return Err(AppError::with_source(ErrorKind::Upload, e.message.clone(), e));
            }
        };

        if incoming.size_bytes > self.max_upload_size_bytes {
            self.blobs.discard(staged).await;
            return Err(AppError::upload(format!(
                "'{name}' exceeds the maximum upload size of {} bytes",
                self.max_upload_size_bytes
            )));
        }

        let record = self
            .files
            .insert(&CreateFile {
                owner_id,
                folder_id,
                name: name.clone(),
                storage_path: staged.to_string(),
                size_bytes: incoming.size_bytes as i64,
                mime_type: incoming.mime_type.clone(),
            })
            .await;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                self.blobs.discard(staged).await;
                return Err(AppError::with_source(
                    ErrorKind::Upload,
                    format!("Failed to record '{name}'"),
                    e,
                ));
            }
        };

        let final_path = layout::final_path(owner_id, record.id, &name);
        if let Err(e) = self.blobs.rename(staged, &final_path).await {
            self.roll_back(&record, &final_path).await;
            return Err(AppError::with_source(
                ErrorKind::Upload,
                format!("Failed to finalize '{name}'"),
                e,
            ));
        }

        match self
            .files
            .update_storage_path(owner_id, record.id, &final_path)
            .await
        {
            Ok(Some(file)) => Ok(CommittedFile::from(&file)),
            Ok(None) => {
                self.roll_back(&record, &final_path).await;
                Err(AppError::upload(format!(
                    "Record for '{name}' disappeared during commit"
                )))
            }
            Err(e) => {
                self.roll_back(&record, &final_path).await;
                Err(AppError::with_source(
                    ErrorKind::Upload,
                    format!("Failed to finalize '{name}'"),
                    e,
                ))
            }
        }
    }

    /// Undo a partially committed file: drop its record and whatever blob
    /// exists at either path.
    async fn roll_back(&self, record: &File, final_path: &str) {
        if let Err(e) = self.files.delete(record.owner_id, record.id).await {
            warn!(file_id = %record.id, error = %e, "Failed to remove record during rollback");
        }
        self.blobs.discard(&record.storage_path).await;
        self.blobs.discard(final_path).await;
    }

    /// Deletes staged blobs that will never be committed.
    ///
    /// Paths outside the caller's staging area are ignored.
    pub async fn discard_staged(&self, ctx: &OwnerContext, incoming: &[IncomingFile]) {
        self.discard_all(ctx.owner_id, incoming).await;
        debug!(owner_id = %ctx.owner_id, count = incoming.len(), "Discarded staged uploads");
    }

    async fn discard_all(&self, owner_id: OwnerId, incoming: &[IncomingFile]) {
        for file in incoming {
            if is_owned_staging_path(owner_id, &file.staged_path) {
                self.blobs.discard(&file.staged_path).await;
            }
        }
    }
}

/// Only staging paths inside the owner's directory may be committed or
/// discarded on the owner's behalf.
fn is_owned_staging_path(owner_id: OwnerId, path: &str) -> bool {
    path.strip_prefix(&layout::owner_dir(owner_id))
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|name| !name.contains('/') && layout::is_staging_path(name))
}

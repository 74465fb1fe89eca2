//! Access facade: the single entry point callers outside the core use.
//!
//! [`Stowage`] wires the stores into the engine services and exposes every
//! operation with the caller's [`OwnerContext`] first. [`Outcome`] turns an
//! [`AppError`] into a status/code/message triple the transport can render.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use stowage_core::config::StorageConfig;
use stowage_core::error::{AppError, ErrorKind};
use stowage_core::result::AppResult;
use stowage_core::traits::storage::{BlobStore, ByteStream};
use stowage_core::types::{FileId, FolderId};
use stowage_database::{FileStore, FolderStore};
use stowage_entity::{File, Folder, FolderNode, FolderView, PathSegment};
use stowage_storage::layout;

use crate::blob::BoundedBlobs;
use crate::context::OwnerContext;
use crate::entry::{Entry, EntryKind};
use crate::file::{
    DownloadService, FileDownload, FileService, IncomingFile, UploadOutcome, UploadService,
};
use crate::folder::{DeletionService, DeletionSummary, FolderService, TreeService};

/// Reachability of both stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    /// Metadata store answered.
    pub metadata: bool,
    /// Blob store answered.
    pub blobs: bool,
}

impl HealthReport {
    /// Whether both stores are healthy.
    pub fn is_healthy(&self) -> bool {
        self.metadata && self.blobs
    }
}

/// The hierarchical storage core.
#[derive(Debug, Clone)]
pub struct Stowage {
    folder_store: Arc<dyn FolderStore>,
    blobs: BoundedBlobs,
    folders: FolderService,
    tree: TreeService,
    deletion: DeletionService,
    files: FileService,
    uploads: UploadService,
    downloads: DownloadService,
    config: StorageConfig,
}

impl Stowage {
    /// Creates the facade over the given stores.
    pub fn new(
        folder_store: Arc<dyn FolderStore>,
        file_store: Arc<dyn FileStore>,
        blob_store: Arc<dyn BlobStore>,
        config: StorageConfig,
    ) -> Self {
        let blobs = BoundedBlobs::new(
            blob_store,
            Duration::from_secs(config.operation_timeout_seconds),
        );

        Self {
            folders: FolderService::new(folder_store.clone(), file_store.clone()),
            tree: TreeService::new(folder_store.clone()),
            deletion: DeletionService::new(
                folder_store.clone(),
                file_store.clone(),
                blobs.clone(),
            ),
            files: FileService::new(folder_store.clone(), file_store.clone(), blobs.clone()),
            uploads: UploadService::new(
                folder_store.clone(),
                file_store.clone(),
                blobs.clone(),
                config.max_upload_size_bytes,
            ),
            downloads: DownloadService::new(file_store, blobs.clone()),
            folder_store,
            blobs,
            config,
        }
    }

    /// Storage configuration in effect.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Sets up a new owner: the blob directory, then the root folder.
    pub async fn provision_owner(&self, ctx: &OwnerContext) -> AppResult<Folder> {
        self.blobs
            .create_dir(&layout::owner_dir(ctx.owner_id))
            .await?;
        let root = self
            .folders
            .create_root(ctx, &self.config.root_folder_name)
            .await?;
        info!(owner_id = %ctx.owner_id, "Owner provisioned");
        Ok(root)
    }

    /// Creates the owner's root folder with the configured name.
    pub async fn create_root_folder(&self, ctx: &OwnerContext) -> AppResult<Folder> {
        self.folders
            .create_root(ctx, &self.config.root_folder_name)
            .await
    }

    /// Creates a subfolder.
    pub async fn create_subfolder(
        &self,
        ctx: &OwnerContext,
        parent_id: FolderId,
        name: &str,
    ) -> AppResult<Folder> {
        self.folders.create_subfolder(ctx, parent_id, name).await
    }

    /// A folder with its parent and direct contents.
    pub async fn resolve_folder(
        &self,
        ctx: &OwnerContext,
        folder_id: FolderId,
    ) -> AppResult<FolderView> {
        self.folders.resolve_folder(ctx, folder_id).await
    }

    /// The root folder with its direct contents.
    pub async fn resolve_root(&self, ctx: &OwnerContext) -> AppResult<FolderView> {
        self.folders.resolve_root(ctx).await
    }

    /// Direct subfolders, ordered by name.
    pub async fn list_subfolders(
        &self,
        ctx: &OwnerContext,
        parent_id: FolderId,
    ) -> AppResult<Vec<Folder>> {
        self.folders.list_subfolders(ctx, parent_id).await
    }

    /// Direct files, ordered by name.
    pub async fn list_files(&self, ctx: &OwnerContext, folder_id: FolderId) -> AppResult<Vec<File>> {
        self.files.list_files(ctx, folder_id).await
    }

    /// A single file record.
    pub async fn get_file(&self, ctx: &OwnerContext, file_id: FileId) -> AppResult<File> {
        self.files.get_file(ctx, file_id).await
    }

    /// The owner's full folder tree.
    pub async fn build_folder_tree(&self, ctx: &OwnerContext) -> AppResult<FolderNode> {
        self.tree.build_tree(ctx).await
    }

    /// Root-first chain of folders leading to `folder_id`.
    pub async fn resolve_ancestor_path(
        &self,
        ctx: &OwnerContext,
        folder_id: FolderId,
    ) -> AppResult<Vec<PathSegment>> {
        self.tree.ancestor_path(ctx, folder_id).await
    }

    /// Number of folders the owner has.
    pub async fn folder_count(&self, ctx: &OwnerContext) -> AppResult<u64> {
        self.folders.count(ctx).await
    }

    /// Renames a folder or a file.
    pub async fn rename_entry(
        &self,
        ctx: &OwnerContext,
        entry_id: Uuid,
        kind: EntryKind,
        new_name: &str,
    ) -> AppResult<Entry> {
        match kind {
            EntryKind::Folder => self
                .folders
                .rename_folder(ctx, FolderId::from_uuid(entry_id), new_name)
                .await
                .map(Entry::Folder),
            EntryKind::File => self
                .files
                .rename_file(ctx, FileId::from_uuid(entry_id), new_name)
                .await
                .map(Entry::File),
        }
    }

    /// Deletes a file, or a folder and its whole subtree.
    pub async fn delete_entry(
        &self,
        ctx: &OwnerContext,
        entry_id: Uuid,
        kind: EntryKind,
    ) -> AppResult<DeletionSummary> {
        match kind {
            EntryKind::Folder => {
                self.deletion
                    .delete_folder(ctx, FolderId::from_uuid(entry_id))
                    .await
            }
            EntryKind::File => {
                self.files
                    .delete_file(ctx, FileId::from_uuid(entry_id))
                    .await?;
                Ok(DeletionSummary {
                    files_removed: 1,
                    ..Default::default()
                })
            }
        }
    }

    /// Writes an incoming stream to a staging path for a later commit.
    pub async fn stage_upload(
        &self,
        ctx: &OwnerContext,
        original_name: &str,
        mime_type: Option<&str>,
        stream: ByteStream,
    ) -> AppResult<IncomingFile> {
        self.uploads
            .stage(ctx, original_name, mime_type, stream)
            .await
    }

    /// Deletes staged files that will not be committed.
    pub async fn discard_staged(&self, ctx: &OwnerContext, files: &[IncomingFile]) {
        self.uploads.discard_staged(ctx, files).await
    }

    /// Commits staged files into a folder.
    pub async fn commit_upload(
        &self,
        ctx: &OwnerContext,
        folder_id: FolderId,
        files: Vec<IncomingFile>,
    ) -> AppResult<Vec<UploadOutcome>> {
        self.uploads.commit_upload(ctx, folder_id, files).await
    }

    /// Opens a stream over a file's bytes.
    pub async fn stream_file_bytes(
        &self,
        ctx: &OwnerContext,
        file_id: FileId,
    ) -> AppResult<FileDownload> {
        self.downloads.stream_file(ctx, file_id).await
    }

    /// Checks both stores.
    pub async fn health_check(&self) -> HealthReport {
        HealthReport {
            metadata: self.folder_store.health_check().await.unwrap_or(false),
            blobs: self.blobs.health_check().await.unwrap_or(false),
        }
    }
}

/// Caller-visible rendering of an engine error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// HTTP-style status code.
    pub status: u16,
    /// Stable error code.
    pub code: &'static str,
    /// Message safe to show the caller.
    pub message: String,
}

impl Outcome {
    /// Maps an error to its caller-visible outcome.
    ///
    /// Server faults are logged here and their details withheld from the
    /// caller.
    pub fn from_error(err: &AppError) -> Self {
        let status = match err.kind {
            ErrorKind::NotFound => 404,
            ErrorKind::DuplicateName | ErrorKind::Conflict => 409,
            ErrorKind::ProtectedEntity | ErrorKind::Authorization => 403,
            ErrorKind::Validation | ErrorKind::Upload => 422,
            ErrorKind::Serialization => 400,
            ErrorKind::Integrity
            | ErrorKind::Io
            | ErrorKind::Store
            | ErrorKind::Configuration
            | ErrorKind::Internal => 500,
        };

        let message = if err.kind.is_server_fault() {
            error!(kind = %err.kind, error = %err, "Server fault surfaced to caller");
            "An internal error occurred".to_string()
        } else {
            err.message.clone()
        };

        Self {
            status,
            code: err.kind.as_str(),
            message,
        }
    }
}

impl From<&AppError> for Outcome {
    fn from(err: &AppError) -> Self {
        Self::from_error(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_status_mapping() {
        assert_eq!(Outcome::from_error(&AppError::not_found("x")).status, 404);
        assert_eq!(
            Outcome::from_error(&AppError::duplicate_name("x")).status,
            409
        );
        assert_eq!(
            Outcome::from_error(&AppError::protected_entity("x")).status,
            403
        );
        assert_eq!(Outcome::from_error(&AppError::validation("x")).status, 422);
    }

    #[test]
    fn test_server_faults_hide_details() {
        let outcome = Outcome::from_error(&AppError::integrity("parent cycle at 42"));
        assert_eq!(outcome.status, 500);
        assert_eq!(outcome.code, "INTEGRITY");
        assert!(!outcome.message.contains("42"));

        let outcome = Outcome::from_error(&AppError::duplicate_name("'Reports' exists"));
        assert_eq!(outcome.message, "'Reports' exists");
    }

    #[test]
    fn test_outcome_serializes() {
        let json = serde_json::to_value(Outcome::from_error(&AppError::not_found("gone"))).unwrap();
        assert_eq!(json["status"], 404);
        assert_eq!(json["code"], "NOT_FOUND");
    }
}

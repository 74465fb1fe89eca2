//! File lookup, rename, and delete.

use std::sync::Arc;

use tracing::info;

use stowage_core::error::AppError;
use stowage_core::result::AppResult;
use stowage_core::types::{FileId, FolderId};
use stowage_database::{FileStore, FolderStore};
use stowage_entity::File;

use crate::blob::BoundedBlobs;
use crate::context::OwnerContext;
use crate::validation::validate_name;

/// Manages file records and their blobs.
#[derive(Debug, Clone)]
pub struct FileService {
    /// Folder store.
    folders: Arc<dyn FolderStore>,
    /// File store.
    files: Arc<dyn FileStore>,
    /// Blob store.
    blobs: BoundedBlobs,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        files: Arc<dyn FileStore>,
        blobs: BoundedBlobs,
    ) -> Self {
        Self {
            folders,
            files,
            blobs,
        }
    }

    /// Gets a file owned by the caller.
    pub async fn get_file(&self, ctx: &OwnerContext, file_id: FileId) -> AppResult<File> {
        self.files
            .find_by_id(ctx.owner_id, file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }

    /// Files directly inside a folder, ordered by name.
    pub async fn list_files(&self, ctx: &OwnerContext, folder_id: FolderId) -> AppResult<Vec<File>> {
        self.folders
            .find_by_id(ctx.owner_id, folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
        self.files.find_by_folder(ctx.owner_id, folder_id).await
    }

    /// Renames a file. Only `name` and `updated_at` change.
    pub async fn rename_file(
        &self,
        ctx: &OwnerContext,
        file_id: FileId,
        new_name: &str,
    ) -> AppResult<File> {
        let new_name = validate_name("File", new_name)?;
        let renamed = self
            .files
            .rename(ctx.owner_id, file_id, &new_name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;

        info!(owner_id = %ctx.owner_id, file_id = %file_id, name = %renamed.name, "File renamed");
        Ok(renamed)
    }

    /// Deletes a file record, then its blob best-effort.
    pub async fn delete_file(&self, ctx: &OwnerContext, file_id: FileId) -> AppResult<()> {
        let file = self.get_file(ctx, file_id).await?;

        if !self.files.delete(ctx.owner_id, file_id).await? {
            return Err(AppError::not_found(format!("File {file_id} not found")));
        }
        let blob_removed = self.blobs.discard(&file.storage_path).await;

        info!(
            owner_id = %ctx.owner_id,
            file_id = %file_id,
            folder_id = %file.folder_id,
            blob_removed,
            "File deleted"
        );
        Ok(())
    }
}

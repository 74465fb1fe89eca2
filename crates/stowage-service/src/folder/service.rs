//! Folder creation, lookup, and rename.

use std::sync::Arc;

use tracing::{info, warn};

use stowage_core::error::AppError;
use stowage_core::result::AppResult;
use stowage_core::types::{FolderId, OwnerId};
use stowage_database::{FileStore, FolderStore};
use stowage_entity::{CreateFolder, Folder, FolderView, PathSegment};

use crate::context::OwnerContext;
use crate::validation::validate_name;

/// Manages folder records for one owner at a time.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Folder store.
    folders: Arc<dyn FolderStore>,
    /// File store.
    files: Arc<dyn FileStore>,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(folders: Arc<dyn FolderStore>, files: Arc<dyn FileStore>) -> Self {
        Self { folders, files }
    }

    /// Fetch a folder owned by the caller or fail with `NotFound`.
    pub async fn require_folder(&self, owner_id: OwnerId, folder_id: FolderId) -> AppResult<Folder> {
        self.folders
            .find_by_id(owner_id, folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }

    /// Creates the owner's root folder. Fails with `Conflict` if one exists.
    pub async fn create_root(&self, ctx: &OwnerContext, name: &str) -> AppResult<Folder> {
        let name = validate_name("Folder", name)?;
        if self.folders.find_root(ctx.owner_id).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Owner {} already has a root folder",
                ctx.owner_id
            )));
        }

        let root = self
            .folders
            .insert(&CreateFolder::root(ctx.owner_id, name))
            .await?;

        info!(owner_id = %ctx.owner_id, folder_id = %root.id, "Root folder created");
        Ok(root)
    }

    /// Creates a subfolder beneath `parent_id`.
    pub async fn create_subfolder(
        &self,
        ctx: &OwnerContext,
        parent_id: FolderId,
        name: &str,
    ) -> AppResult<Folder> {
        let name = validate_name("Folder", name)?;
        let parent = self.require_folder(ctx.owner_id, parent_id).await?;

        let siblings = self.folders.find_children(ctx.owner_id, parent.id).await?;
        if siblings.iter().any(|f| f.name == name) {
            return Err(AppError::duplicate_name(format!(
                "A folder named '{name}' already exists in '{}'",
                parent.name
            )));
        }

        // A concurrent insert that wins the race surfaces here as
        // DuplicateName from the store's uniqueness constraint.
        let folder = self
            .folders
            .insert(&CreateFolder::child(ctx.owner_id, parent.id, name))
            .await?;
        self.touch(ctx.owner_id, parent.id).await;

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder.id,
            parent_id = %parent.id,
            name = %folder.name,
            "Folder created"
        );
        Ok(folder)
    }

    /// The folder, its parent reference, and its direct contents.
    pub async fn resolve_folder(
        &self,
        ctx: &OwnerContext,
        folder_id: FolderId,
    ) -> AppResult<FolderView> {
        let folder = self.require_folder(ctx.owner_id, folder_id).await?;
        self.view_of(ctx.owner_id, folder).await
    }

    /// The owner's root folder and its direct contents.
    pub async fn resolve_root(&self, ctx: &OwnerContext) -> AppResult<FolderView> {
        let root = self
            .folders
            .find_root(ctx.owner_id)
            .await?
            .ok_or_else(|| AppError::not_found("Root folder not found"))?;
        self.view_of(ctx.owner_id, root).await
    }

    async fn view_of(&self, owner_id: OwnerId, folder: Folder) -> AppResult<FolderView> {
        let parent = match folder.parent_id {
            Some(parent_id) => self
                .folders
                .find_by_id(owner_id, parent_id)
                .await?
                .map(|p| PathSegment::from(&p)),
            None => None,
        };
        let subfolders = self.folders.find_children(owner_id, folder.id).await?;
        let files = self.files.find_by_folder(owner_id, folder.id).await?;

        Ok(FolderView {
            folder,
            parent,
            subfolders,
            files,
        })
    }

    /// Direct subfolders of `parent_id`, ordered by name.
    pub async fn list_subfolders(
        &self,
        ctx: &OwnerContext,
        parent_id: FolderId,
    ) -> AppResult<Vec<Folder>> {
        self.require_folder(ctx.owner_id, parent_id).await?;
        self.folders.find_children(ctx.owner_id, parent_id).await
    }

    /// Renames a folder. The root folder is protected.
    pub async fn rename_folder(
        &self,
        ctx: &OwnerContext,
        folder_id: FolderId,
        new_name: &str,
    ) -> AppResult<Folder> {
        let folder = self.require_folder(ctx.owner_id, folder_id).await?;
        if folder.is_protected() {
            return Err(AppError::protected_entity("The root folder cannot be renamed"));
        }
        let new_name = validate_name("Folder", new_name)?;

        let renamed = self
            .folders
            .rename(ctx.owner_id, folder_id, &new_name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;

        if let Some(parent_id) = renamed.parent_id {
            self.touch(ctx.owner_id, parent_id).await;
        }

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder_id,
            from = %folder.name,
            to = %renamed.name,
            "Folder renamed"
        );
        Ok(renamed)
    }

    /// Number of folders the owner has.
    pub async fn count(&self, ctx: &OwnerContext) -> AppResult<u64> {
        self.folders.count_by_owner(ctx.owner_id).await
    }

    /// Bump a folder's `updated_at`. Failure only loses recency ordering, so
    /// it is logged rather than returned.
    pub(crate) async fn touch(&self, owner_id: OwnerId, folder_id: FolderId) {
        if let Err(e) = self.folders.touch(owner_id, folder_id).await {
            warn!(owner_id = %owner_id, folder_id = %folder_id, error = %e, "Failed to touch folder");
        }
    }
}

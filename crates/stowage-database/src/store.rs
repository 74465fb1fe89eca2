//! Metadata store traits.
//!
//! Every owner-scoped lookup takes the owner id alongside the entity id and
//! treats a record owned by someone else exactly like a missing one. The
//! two `list_*` structural queries are deliberately unscoped: the deletion
//! planner uses them to notice foreign-owned children.

use async_trait::async_trait;

use stowage_core::result::AppResult;
use stowage_core::types::{FileId, FolderId, OwnerId};
use stowage_entity::{CreateFile, CreateFolder, DeletionPlan, File, Folder};

/// Persistent folder records.
#[async_trait]
pub trait FolderStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a folder.
    ///
    /// Fails with `DuplicateName` when a sibling already uses the name,
    /// `Conflict` when a second root is created for the owner, and
    /// `NotFound` when the parent does not exist for that owner.
    async fn insert(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Find a folder owned by `owner_id`.
    async fn find_by_id(&self, owner_id: OwnerId, id: FolderId) -> AppResult<Option<Folder>>;

    /// Find the owner's root folder.
    async fn find_root(&self, owner_id: OwnerId) -> AppResult<Option<Folder>>;

    /// Direct child folders of `parent_id`, ordered by name.
    async fn find_children(&self, owner_id: OwnerId, parent_id: FolderId)
    -> AppResult<Vec<Folder>>;

    /// Every folder of the owner, ordered by creation time.
    async fn find_all_by_owner(&self, owner_id: OwnerId) -> AppResult<Vec<Folder>>;

    /// Number of folders the owner has.
    async fn count_by_owner(&self, owner_id: OwnerId) -> AppResult<u64>;

    /// Rename a folder, bumping its `updated_at`.
    async fn rename(
        &self,
        owner_id: OwnerId,
        id: FolderId,
        name: &str,
    ) -> AppResult<Option<Folder>>;

    /// Bump `updated_at` without changing anything else.
    async fn touch(&self, owner_id: OwnerId, id: FolderId) -> AppResult<bool>;

    /// Direct children of `parent_id` regardless of owner.
    async fn list_child_folders(&self, parent_id: FolderId) -> AppResult<Vec<Folder>>;

    /// Remove every file row and folder row named in `plan` atomically.
    ///
    /// Rows are locked and their ownership re-verified first; a row owned by
    /// someone else aborts with `Authorization`. A folder that gained a
    /// child since planning aborts with `Conflict`. Rows that vanished in
    /// the meantime are skipped.
    async fn delete_subtree(&self, plan: &DeletionPlan) -> AppResult<()>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Persistent file records.
#[async_trait]
pub trait FileStore: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a file. Fails with `NotFound` when the folder does not exist
    /// for that owner.
    async fn insert(&self, data: &CreateFile) -> AppResult<File>;

    /// Find a file owned by `owner_id`.
    async fn find_by_id(&self, owner_id: OwnerId, id: FileId) -> AppResult<Option<File>>;

    /// Files directly inside `folder_id`, ordered by name.
    async fn find_by_folder(&self, owner_id: OwnerId, folder_id: FolderId)
    -> AppResult<Vec<File>>;

    /// Files directly inside `folder_id` regardless of owner.
    async fn list_folder_files(&self, folder_id: FolderId) -> AppResult<Vec<File>>;

    /// Point a file record at a new blob path.
    async fn update_storage_path(
        &self,
        owner_id: OwnerId,
        id: FileId,
        storage_path: &str,
    ) -> AppResult<Option<File>>;

    /// Rename a file, bumping its `updated_at`.
    async fn rename(&self, owner_id: OwnerId, id: FileId, name: &str)
    -> AppResult<Option<File>>;

    /// Delete a file record. Returns whether a row was removed.
    async fn delete(&self, owner_id: OwnerId, id: FileId) -> AppResult<bool>;
}

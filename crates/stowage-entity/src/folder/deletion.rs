//! The unit of work handed to a metadata store for a recursive delete.

use serde::{Deserialize, Serialize};

use stowage_core::types::{FileId, FolderId, OwnerId};

use crate::file::File;

/// Everything a recursive folder deletion will remove.
///
/// `folders` is in post-order: every folder appears after all of its
/// descendants and the subtree root comes last, so deleting in sequence
/// never removes a row that still has a live child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionPlan {
    /// The owner every row in the plan must belong to.
    pub owner_id: OwnerId,
    /// Folder IDs, deepest first, subtree root last.
    pub folders: Vec<FolderId>,
    /// Files held by the folders above.
    pub files: Vec<File>,
}

impl DeletionPlan {
    /// Create an empty plan for `owner_id`.
    pub fn new(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            folders: Vec::new(),
            files: Vec::new(),
        }
    }

    /// The folder the deletion was requested for.
    pub fn target(&self) -> Option<FolderId> {
        self.folders.last().copied()
    }

    /// Whether `id` is scheduled for deletion.
    pub fn contains_folder(&self, id: FolderId) -> bool {
        self.folders.contains(&id)
    }

    /// IDs of the files scheduled for deletion.
    pub fn file_ids(&self) -> Vec<FileId> {
        self.files.iter().map(|f| f.id).collect()
    }

    /// Storage paths whose blobs should be removed once metadata is gone.
    pub fn blob_paths(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.storage_path.as_str())
    }
}

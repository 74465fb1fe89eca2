//! Recursive folder deletion.
//!
//! Deletion runs in three phases. The subtree is first walked in post-order
//! and every folder and file is checked against the caller; nothing is
//! touched if any entry belongs to someone else. The metadata rows are then
//! removed in one store transaction, which re-verifies ownership under row
//! locks. Blobs are deleted last and only best-effort, so an interrupted
//! deletion can leave orphaned blobs but never a row pointing at a missing
//! blob.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use stowage_core::error::{AppError, ErrorKind};
use stowage_core::result::AppResult;
use stowage_core::types::{FolderId, OwnerId};
use stowage_database::{FileStore, FolderStore};
use stowage_entity::{DeletionPlan, Folder};

use crate::blob::BoundedBlobs;
use crate::context::OwnerContext;

/// Planning is repeated this many times when a child appears mid-delete.
pub const MAX_DELETE_ATTEMPTS: usize = 3;

/// What a folder deletion removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionSummary {
    /// Folder rows removed, including the target.
    pub folders_removed: usize,
    /// File rows removed.
    pub files_removed: usize,
    /// Blobs whose deletion was attempted.
    pub blobs_attempted: usize,
    /// Blobs that were actually removed.
    pub blobs_removed: usize,
}

/// Deletes folder subtrees across the metadata and blob stores.
#[derive(Debug, Clone)]
pub struct DeletionService {
    /// Folder store.
    folders: Arc<dyn FolderStore>,
    /// File store.
    files: Arc<dyn FileStore>,
    /// Blob store.
    blobs: BoundedBlobs,
}

impl DeletionService {
    /// Creates a new deletion service.
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

    /// Deletes a folder and everything beneath it.
    pub async fn delete_folder(
        &self,
        ctx: &OwnerContext,
        folder_id: FolderId,
    ) -> AppResult<DeletionSummary> {
        let target = self
            .folders
            .find_by_id(ctx.owner_id, folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
        if target.is_protected() {
            return Err(AppError::protected_entity("The root folder cannot be deleted"));
        }

        let mut attempt = 1;
        let plan = loop {
            let plan = self.plan(ctx.owner_id, &target).await?;
            match self.folders.delete_subtree(&plan).await {
                Ok(()) => break plan,
                Err(e) if e.is(ErrorKind::Conflict) && attempt < MAX_DELETE_ATTEMPTS => {
                    warn!(
                        owner_id = %ctx.owner_id,
                        folder_id = %folder_id,
                        attempt,
                        "Subtree changed during deletion; re-planning"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        if let Some(parent_id) = target.parent_id {
            if let Err(e) = self.folders.touch(ctx.owner_id, parent_id).await {
                warn!(owner_id = %ctx.owner_id, folder_id = %parent_id, error = %e, "Failed to touch folder");
            }
        }

        let mut summary = DeletionSummary {
            folders_removed: plan.folders.len(),
            files_removed: plan.files.len(),
            ..Default::default()
        };
        for path in plan.blob_paths() {
            summary.blobs_attempted += 1;
            if self.blobs.discard(path).await {
                summary.blobs_removed += 1;
            }
        }

        info!(
            owner_id = %ctx.owner_id,
            folder_id = %folder_id,
            folders = summary.folders_removed,
            files = summary.files_removed,
            blobs = summary.blobs_removed,
            "Folder deleted"
        );
        Ok(summary)
    }

    /// Walk the subtree under `target` and collect everything to remove.
    ///
    /// The walk uses the unscoped child queries so a foreign-owned entry is
    /// seen and rejected rather than silently skipped.
    pub async fn plan(&self, owner_id: OwnerId, target: &Folder) -> AppResult<DeletionPlan> {
        let mut plan = DeletionPlan::new(owner_id);
        let mut seen = HashSet::new();
        let mut stack = vec![(target.id, false)];

        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                plan.folders.push(id);
                continue;
            }
            if !seen.insert(id) {
                return Err(AppError::integrity(format!(
                    "Folder {id} is reachable twice from {}",
                    target.id
                )));
            }
            stack.push((id, true));

            for child in self.folders.list_child_folders(id).await? {
                if child.owner_id != owner_id {
                    warn!(owner_id = %owner_id, folder_id = %child.id, "Foreign folder inside subtree");
                    return Err(AppError::authorization(
                        "Folder subtree contains entries owned by another account",
                    ));
                }
                stack.push((child.id, false));
            }

            for file in self.files.list_folder_files(id).await? {
                if file.owner_id != owner_id {
                    warn!(owner_id = %owner_id, file_id = %file.id, "Foreign file inside subtree");
                    return Err(AppError::authorization(
                        "Folder subtree contains entries owned by another account",
                    ));
                }
                plan.files.push(file);
            }
        }

        Ok(plan)
    }
}

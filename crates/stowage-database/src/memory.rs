//! In-process metadata store.
//!
//! Holds folders and files behind a single lock and enforces the same
//! constraints as the PostgreSQL schema: unique sibling names, one root per
//! owner, same-owner parent references, and no removal of a folder that
//! still has children. Used by tests and by single-process deployments that
//! do not need durability.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use stowage_core::error::AppError;
use stowage_core::result::AppResult;
use stowage_core::types::{FileId, FolderId, OwnerId};
use stowage_entity::{CreateFile, CreateFolder, DeletionPlan, File, Folder};

use crate::store::{FileStore, FolderStore};

#[derive(Debug, Default)]
struct MemoryState {
    folders: HashMap<FolderId, Folder>,
    files: HashMap<FileId, File>,
    /// Insertion sequence, used to break `created_at` ties.
    sequence: HashMap<FolderId, u64>,
    next_sequence: u64,
}

impl MemoryState {
    fn owned_folder(&self, owner_id: OwnerId, id: FolderId) -> Option<&Folder> {
        self.folders.get(&id).filter(|f| f.owner_id == owner_id)
    }

    fn sibling_name_taken(
        &self,
        owner_id: OwnerId,
        parent_id: Option<FolderId>,
        name: &str,
        except: Option<FolderId>,
    ) -> bool {
        self.folders.values().any(|f| {
            f.owner_id == owner_id
                && f.parent_id == parent_id
                && f.name == name
                && Some(f.id) != except
        })
    }
}

/// Monotonic timestamp source so consecutive updates always differ.
fn bump(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

/// A metadata store kept entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryMetadataStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryMetadataStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of file records across all owners.
    pub async fn file_count(&self) -> usize {
        self.state.read().await.files.len()
    }

    /// Number of folder records across all owners.
    pub async fn folder_count(&self) -> usize {
        self.state.read().await.folders.len()
    }
}

#[async_trait]
impl FolderStore for MemoryMetadataStore {
    async fn insert(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut state = self.state.write().await;

        match data.parent_id {
            None => {
                if state
                    .folders
                    .values()
                    .any(|f| f.owner_id == data.owner_id && f.parent_id.is_none())
                {
                    return Err(AppError::conflict(format!(
                        "Owner already has a root folder ('{}')",
                        data.name
                    )));
                }
            }
            Some(parent_id) => {
                if state.owned_folder(data.owner_id, parent_id).is_none() {
                    return Err(AppError::not_found("Parent folder not found"));
                }
            }
        }

        if state.sibling_name_taken(data.owner_id, data.parent_id, &data.name, None) {
            return Err(AppError::duplicate_name(format!(
                "A folder named '{}' already exists here",
                data.name
            )));
        }

        let now = Utc::now();
        let folder = Folder {
            id: FolderId::from_uuid(Uuid::now_v7()),
            owner_id: data.owner_id,
            name: data.name.clone(),
            parent_id: data.parent_id,
            is_root: data.parent_id.is_none(),
            created_at: now,
            updated_at: now,
        };

        let seq = state.next_sequence;
        state.next_sequence += 1;
        state.sequence.insert(folder.id, seq);
        state.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn find_by_id(&self, owner_id: OwnerId, id: FolderId) -> AppResult<Option<Folder>> {
        Ok(self.state.read().await.owned_folder(owner_id, id).cloned())
    }

    async fn find_root(&self, owner_id: OwnerId) -> AppResult<Option<Folder>> {
        let state = self.state.read().await;
        Ok(state
            .folders
            .values()
            .find(|f| f.owner_id == owner_id && f.parent_id.is_none())
            .cloned())
    }

    async fn find_children(
        &self,
        owner_id: OwnerId,
        parent_id: FolderId,
    ) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        let mut children: Vec<Folder> = state
            .folders
            .values()
            .filter(|f| f.owner_id == owner_id && f.parent_id == Some(parent_id))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    async fn find_all_by_owner(&self, owner_id: OwnerId) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        let mut folders: Vec<Folder> = state
            .folders
            .values()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect();
        folders.sort_by_key(|f| (f.created_at, state.sequence.get(&f.id).copied()));
        Ok(folders)
    }

    async fn count_by_owner(&self, owner_id: OwnerId) -> AppResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .folders
            .values()
            .filter(|f| f.owner_id == owner_id)
            .count() as u64)
    }

    async fn rename(
        &self,
        owner_id: OwnerId,
        id: FolderId,
        name: &str,
    ) -> AppResult<Option<Folder>> {
        let mut state = self.state.write().await;
        let Some(parent_id) = state.owned_folder(owner_id, id).map(|f| f.parent_id) else {
            return Ok(None);
        };
        if state.sibling_name_taken(owner_id, parent_id, name, Some(id)) {
            return Err(AppError::duplicate_name(format!(
                "A folder named '{name}' already exists here"
            )));
        }

        Ok(state.folders.get_mut(&id).map(|folder| {
            folder.name = name.to_string();
            folder.updated_at = bump(folder.updated_at);
            folder.clone()
        }))
    }

    async fn touch(&self, owner_id: OwnerId, id: FolderId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        match state.folders.get_mut(&id) {
            Some(folder) if folder.owner_id == owner_id => {
                folder.updated_at = bump(folder.updated_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_child_folders(&self, parent_id: FolderId) -> AppResult<Vec<Folder>> {
        let state = self.state.read().await;
        Ok(state
            .folders
            .values()
            .filter(|f| f.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn delete_subtree(&self, plan: &DeletionPlan) -> AppResult<()> {
        let mut state = self.state.write().await;

        let foreign_folder = plan
            .folders
            .iter()
            .filter_map(|id| state.folders.get(id))
            .any(|f| f.owner_id != plan.owner_id);
        let foreign_file = plan
            .files
            .iter()
            .filter_map(|f| state.files.get(&f.id))
            .any(|f| f.owner_id != plan.owner_id);
        if foreign_folder || foreign_file {
            return Err(AppError::authorization(
                "Folder subtree contains entries owned by another account",
            ));
        }

        // Validate the whole plan before touching anything so a rejected
        // plan leaves the state unchanged.
        let doomed_files: Vec<FileId> = plan.file_ids();
        for (pos, id) in plan.folders.iter().enumerate() {
            for child in state.folders.values().filter(|f| f.parent_id == Some(*id)) {
                match plan.folders.iter().position(|planned| *planned == child.id) {
                    None => {
                        return Err(AppError::conflict(format!(
                            "Folder {id} gained new entries while being deleted"
                        )));
                    }
                    Some(child_pos) if child_pos > pos => {
                        return Err(AppError::integrity(format!(
                            "Deletion plan is not in post-order at folder {id}"
                        )));
                    }
                    Some(_) => {}
                }
            }
            if state
                .files
                .values()
                .any(|f| f.folder_id == *id && !doomed_files.contains(&f.id))
            {
                return Err(AppError::conflict(format!(
                    "Folder {id} gained new entries while being deleted"
                )));
            }
        }

        for id in &doomed_files {
            state.files.remove(id);
        }
        for id in &plan.folders {
            state.folders.remove(id);
            state.sequence.remove(id);
        }
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[async_trait]
impl FileStore for MemoryMetadataStore {
    async fn insert(&self, data: &CreateFile) -> AppResult<File> {
        let mut state = self.state.write().await;
        if state.owned_folder(data.owner_id, data.folder_id).is_none() {
            return Err(AppError::not_found(format!(
                "Folder {} not found",
                data.folder_id
            )));
        }

        let now = Utc::now();
        let file = File {
            id: FileId::from_uuid(Uuid::now_v7()),
            owner_id: data.owner_id,
            folder_id: data.folder_id,
            name: data.name.clone(),
            storage_path: data.storage_path.clone(),
            size_bytes: data.size_bytes,
            mime_type: data.mime_type.clone(),
            created_at: now,
            updated_at: now,
        };
        state.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn find_by_id(&self, owner_id: OwnerId, id: FileId) -> AppResult<Option<File>> {
        let state = self.state.read().await;
        Ok(state
            .files
            .get(&id)
            .filter(|f| f.owner_id == owner_id)
            .cloned())
    }

    async fn find_by_folder(&self, owner_id: OwnerId, folder_id: FolderId) -> AppResult<Vec<File>> {
        let state = self.state.read().await;
        let mut files: Vec<File> = state
            .files
            .values()
            .filter(|f| f.owner_id == owner_id && f.folder_id == folder_id)
            .cloned()
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn list_folder_files(&self, folder_id: FolderId) -> AppResult<Vec<File>> {
        let state = self.state.read().await;
        Ok(state
            .files
            .values()
            .filter(|f| f.folder_id == folder_id)
            .cloned()
            .collect())
    }

    async fn update_storage_path(
        &self,
        owner_id: OwnerId,
        id: FileId,
        storage_path: &str,
    ) -> AppResult<Option<File>> {
        let mut state = self.state.write().await;
        Ok(state
            .files
            .get_mut(&id)
            .filter(|f| f.owner_id == owner_id)
            .map(|file| {
                file.storage_path = storage_path.to_string();
                file.updated_at = bump(file.updated_at);
                file.clone()
            }))
    }

    async fn rename(&self, owner_id: OwnerId, id: FileId, name: &str) -> AppResult<Option<File>> {
        let mut state = self.state.write().await;
        Ok(state
            .files
            .get_mut(&id)
            .filter(|f| f.owner_id == owner_id)
            .map(|file| {
                file.name = name.to_string();
                file.updated_at = bump(file.updated_at);
                file.clone()
            }))
    }

    async fn delete(&self, owner_id: OwnerId, id: FileId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let owned = state.files.get(&id).is_some_and(|f| f.owner_id == owner_id);
        if owned {
            state.files.remove(&id);
        }
        Ok(owned)
    }
}

//! Integration tests for file and recursive folder deletion.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use stowage_core::config::StorageConfig;
use stowage_core::error::ErrorKind;
use stowage_core::result::AppResult;
use stowage_core::types::{FolderId, OwnerId};
use stowage_database::{FolderStore, MemoryMetadataStore};
use stowage_entity::{CreateFolder, DeletionPlan, Folder};
use stowage_service::{EntryKind, OwnerContext, Stowage};
use stowage_storage::LocalBlobStore;

#[tokio::test]
async fn test_delete_folder_removes_subtree_and_blobs() {
    let app = helpers::TestApp::new().await;
    let (ctx, root) = app.owner().await;

    let target = app.mkdir(&ctx, root.id, "Archive").await;
    let full = app.mkdir(&ctx, target.id, "Full").await;
    app.mkdir(&ctx, target.id, "Empty").await;
    let keep = app.mkdir(&ctx, root.id, "Keep").await;

    let mut paths = Vec::new();
    for outcome in app
        .upload(&ctx, full.id, &[("1.txt", "one"), ("2.txt", "two"), ("3.txt", "three")])
        .await
        .into_iter()
        .chain(app.upload(&ctx, target.id, &[("top.txt", "top")]).await)
    {
        let id = outcome.committed().unwrap().id;
        paths.push(app.stowage.get_file(&ctx, id).await.unwrap().storage_path);
    }
    app.upload(&ctx, keep.id, &[("kept.txt", "kept")]).await;
    assert_eq!(app.store.file_count().await, 5);

    let summary = app
        .stowage
        .delete_entry(&ctx, target.id.into_uuid(), EntryKind::Folder)
        .await
        .unwrap();

    assert_eq!(summary.folders_removed, 3);
    assert_eq!(summary.files_removed, 4);
    assert_eq!(summary.blobs_attempted, 4);
    assert_eq!(summary.blobs_removed, 4);
    for path in &paths {
        assert!(!app.blobs.exists(path).await.unwrap(), "{path} still exists");
    }

    assert_eq!(app.store.file_count().await, 1);
    let tree = app.stowage.build_folder_tree(&ctx).await.unwrap();
    assert_eq!(tree.flatten_names(), vec!["Keep"]);
}

#[tokio::test]
async fn test_root_folder_cannot_be_deleted() {
    let app = helpers::TestApp::new().await;
    let (ctx, root) = app.owner().await;
    let child = app.mkdir(&ctx, root.id, "Child").await;
    app.upload(&ctx, child.id, &[("a.txt", "a")]).await;

    let err = app
        .stowage
        .delete_entry(&ctx, root.id.into_uuid(), EntryKind::Folder)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ProtectedEntity);
    assert_eq!(app.stowage.folder_count(&ctx).await.unwrap(), 2);
    assert_eq!(app.store.file_count().await, 1);
}

#[tokio::test]
async fn test_deleting_twice_is_not_found_both_times() {
    let app = helpers::TestApp::new().await;
    let (ctx, root) = app.owner().await;
    let outcomes = app.upload(&ctx, root.id, &[("once.txt", "x")]).await;
    let file_id = outcomes[0].committed().unwrap().id.into_uuid();
    let folder = app.mkdir(&ctx, root.id, "Gone").await;

    app.stowage
        .delete_entry(&ctx, file_id, EntryKind::File)
        .await
        .unwrap();
    app.stowage
        .delete_entry(&ctx, folder.id.into_uuid(), EntryKind::Folder)
        .await
        .unwrap();
    let folders_after = app.store.folder_count().await;

    for _ in 0..2 {
        let err = app
            .stowage
            .delete_entry(&ctx, file_id, EntryKind::File)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        let err = app
            .stowage
            .delete_entry(&ctx, folder.id.into_uuid(), EntryKind::Folder)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
    assert_eq!(app.store.folder_count().await, folders_after);
}

#[tokio::test]
async fn test_delete_file_survives_missing_blob() {
    let app = helpers::TestApp::new().await;
    let (ctx, root) = app.owner().await;
    let outcomes = app.upload(&ctx, root.id, &[("lost.txt", "bytes")]).await;
    let id = outcomes[0].committed().unwrap().id;
    let file = app.stowage.get_file(&ctx, id).await.unwrap();
    app.blobs.delete(&file.storage_path).await.unwrap();

    app.stowage
        .delete_entry(&ctx, id.into_uuid(), EntryKind::File)
        .await
        .unwrap();
    let err = app.stowage.get_file(&ctx, id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_other_owner_cannot_delete() {
    let app = helpers::TestApp::new().await;
    let (alice, root) = app.owner().await;
    let (bob, _) = app.owner().await;
    let folder = app.mkdir(&alice, root.id, "Private").await;
    let outcomes = app.upload(&alice, folder.id, &[("p.txt", "p")]).await;
    let file_id = outcomes[0].committed().unwrap().id;

    let err = app
        .stowage
        .delete_entry(&bob, folder.id.into_uuid(), EntryKind::Folder)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = app
        .stowage
        .delete_entry(&bob, file_id.into_uuid(), EntryKind::File)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(app.stowage.get_file(&alice, file_id).await.is_ok());
}

/// A folder store that adds a child to the folder being deleted right
/// before the first deletion transaction, simulating a concurrent create.
#[derive(Debug)]
struct RacingFolderStore {
    inner: MemoryMetadataStore,
    raced: AtomicBool,
}

#[async_trait]
impl FolderStore for RacingFolderStore {
    async fn insert(&self, data: &CreateFolder) -> AppResult<Folder> {
        FolderStore::insert(&self.inner, data).await
    }

    async fn find_by_id(&self, owner_id: OwnerId, id: FolderId) -> AppResult<Option<Folder>> {
        FolderStore::find_by_id(&self.inner, owner_id, id).await
    }

    async fn find_root(&self, owner_id: OwnerId) -> AppResult<Option<Folder>> {
        self.inner.find_root(owner_id).await
    }

    async fn find_children(&self, owner_id: OwnerId, parent_id: FolderId) -> AppResult<Vec<Folder>> {
        self.inner.find_children(owner_id, parent_id).await
    }

    async fn find_all_by_owner(&self, owner_id: OwnerId) -> AppResult<Vec<Folder>> {
        self.inner.find_all_by_owner(owner_id).await
    }

    async fn count_by_owner(&self, owner_id: OwnerId) -> AppResult<u64> {
        self.inner.count_by_owner(owner_id).await
    }

    async fn rename(&self, owner_id: OwnerId, id: FolderId, name: &str) -> AppResult<Option<Folder>> {
        FolderStore::rename(&self.inner, owner_id, id, name).await
    }

    async fn touch(&self, owner_id: OwnerId, id: FolderId) -> AppResult<bool> {
        self.inner.touch(owner_id, id).await
    }

    async fn list_child_folders(&self, parent_id: FolderId) -> AppResult<Vec<Folder>> {
        self.inner.list_child_folders(parent_id).await
    }

    async fn delete_subtree(&self, plan: &DeletionPlan) -> AppResult<()> {
        if !self.raced.swap(true, Ordering::SeqCst) {
            if let Some(target) = plan.target() {
                let late = CreateFolder::child(plan.owner_id, target, "Late Arrival");
                FolderStore::insert(&self.inner, &late).await?;
            }
        }
        self.inner.delete_subtree(plan).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}

#[tokio::test]
async fn test_concurrent_child_is_swept_up_by_replanning() {
    let dir = tempfile::tempdir().unwrap();
    let blobs = Arc::new(LocalBlobStore::new(dir.path()).await.unwrap());
    let inner = MemoryMetadataStore::new();
    let folders = Arc::new(RacingFolderStore {
        inner: inner.clone(),
        raced: AtomicBool::new(false),
    });
    let stowage = Stowage::new(folders, Arc::new(inner.clone()), blobs, StorageConfig::default());

    let ctx = OwnerContext::new(OwnerId::new());
    let root = stowage.provision_owner(&ctx).await.unwrap();
    let target = stowage
        .create_subfolder(&ctx, root.id, "Busy")
        .await
        .unwrap();

    let summary = stowage
        .delete_entry(&ctx, target.id.into_uuid(), EntryKind::Folder)
        .await
        .unwrap();

    // The late child was planned on the second attempt and removed too.
    assert_eq!(summary.folders_removed, 2);
    assert_eq!(inner.folder_count().await, 1);
}

//! Integration tests for folder creation, lookup, tree building, and rename.

mod helpers;

use std::sync::Arc;

use stowage_core::error::ErrorKind;
use stowage_core::types::{FileId, FolderId, OwnerId};
use stowage_service::{Entry, EntryKind, OwnerContext};

#[tokio::test]
async fn test_provisioning_creates_single_root() {
    let app = helpers::TestApp::new().await;
    let (ctx, root) = app.owner().await;

    assert!(root.is_root);
    assert_eq!(root.name, "Root Folder");
    assert!(app.blobs.exists(&ctx.owner_id.to_string()).await.unwrap());

    let err = app.stowage.provision_owner(&ctx).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    let err = app.stowage.create_root_folder(&ctx).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(app.stowage.folder_count(&ctx).await.unwrap(), 1);
}

#[tokio::test]
async fn test_failed_blob_dir_leaves_owner_unprovisioned() {
    let app = helpers::TestApp::with_blobs(|local| {
        Arc::new(helpers::FailingBlobStore::new(local, Vec::new()).failing_dirs(1))
    })
    .await;
    let ctx = OwnerContext::new(OwnerId::new());

    let err = app.stowage.provision_owner(&ctx).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Io);
    assert_eq!(app.stowage.folder_count(&ctx).await.unwrap(), 0);
    assert_eq!(app.store.folder_count().await, 0);

    // A retry succeeds once the blob store recovers.
    let root = app.stowage.provision_owner(&ctx).await.unwrap();
    assert!(root.is_root);
    assert!(app.blobs.exists(&ctx.owner_id.to_string()).await.unwrap());
    assert_eq!(app.stowage.folder_count(&ctx).await.unwrap(), 1);
}

#[tokio::test]
async fn test_duplicate_names_only_clash_among_siblings() {
    let app = helpers::TestApp::new().await;
    let (ctx, root) = app.owner().await;
    let projects = app.mkdir(&ctx, root.id, "Projects").await;

    app.mkdir(&ctx, root.id, "Reports").await;
    let err = app
        .stowage
        .create_subfolder(&ctx, root.id, "Reports")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DuplicateName);

    // Same name under a different parent of the same owner is fine.
    app.mkdir(&ctx, projects.id, "Reports").await;

    // Matching is case-sensitive.
    app.mkdir(&ctx, root.id, "reports").await;
}

#[tokio::test]
async fn test_tree_covers_every_folder() {
    let app = helpers::TestApp::new().await;
    let (ctx, root) = app.owner().await;
    let a = app.mkdir(&ctx, root.id, "A").await;
    let b = app.mkdir(&ctx, root.id, "B").await;
    let a1 = app.mkdir(&ctx, a.id, "A1").await;
    app.mkdir(&ctx, a1.id, "A1x").await;
    app.mkdir(&ctx, b.id, "B1").await;

    // Another owner's folders never leak into this tree.
    let (other, other_root) = app.owner().await;
    app.mkdir(&other, other_root.id, "Elsewhere").await;

    let tree = app.stowage.build_folder_tree(&ctx).await.unwrap();
    assert_eq!(tree.folder.id, root.id);
    assert_eq!(
        tree.count() as u64,
        app.stowage.folder_count(&ctx).await.unwrap()
    );
    assert_eq!(tree.height(), 3);
    assert_eq!(tree.flatten_names(), vec!["A", "A1", "A1x", "B", "B1"]);
}

#[tokio::test]
async fn test_tree_for_unprovisioned_owner_is_integrity_error() {
    let app = helpers::TestApp::new().await;
    let ctx = OwnerContext::new(OwnerId::new());

    let err = app.stowage.build_folder_tree(&ctx).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Integrity);
}

#[tokio::test]
async fn test_ancestor_path_is_root_first() {
    let app = helpers::TestApp::new().await;
    let (ctx, root) = app.owner().await;

    let path = app
        .stowage
        .resolve_ancestor_path(&ctx, root.id)
        .await
        .unwrap();
    assert_eq!(path.len(), 1);
    assert_eq!(path[0].id, root.id);

    let mut parent = root.id;
    let mut ids = vec![root.id];
    for depth in 1..=4 {
        let folder = app.mkdir(&ctx, parent, &format!("level-{depth}")).await;
        ids.push(folder.id);
        parent = folder.id;
    }

    let path = app
        .stowage
        .resolve_ancestor_path(&ctx, parent)
        .await
        .unwrap();
    assert_eq!(path.len(), 5);
    assert_eq!(path.iter().map(|s| s.id).collect::<Vec<_>>(), ids);
    assert_eq!(path[0].name, "Root Folder");
    assert_eq!(path[4].name, "level-4");
}

#[tokio::test]
async fn test_foreign_folders_look_missing() {
    let app = helpers::TestApp::new().await;
    let (alice, alice_root) = app.owner().await;
    let (bob, _) = app.owner().await;
    let secret = app.mkdir(&alice, alice_root.id, "Secret").await;

    let err = app.stowage.resolve_folder(&bob, secret.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = app
        .stowage
        .resolve_ancestor_path(&bob, secret.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = app
        .stowage
        .rename_entry(&bob, secret.id.into_uuid(), EntryKind::Folder, "Mine")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    let err = app
        .stowage
        .resolve_folder(&alice, FolderId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_resolve_folder_lists_contents_by_name() {
    let app = helpers::TestApp::new().await;
    let (ctx, root) = app.owner().await;
    let docs = app.mkdir(&ctx, root.id, "Docs").await;
    app.mkdir(&ctx, docs.id, "Zeta").await;
    app.mkdir(&ctx, docs.id, "Alpha").await;
    app.upload(&ctx, docs.id, &[("b.txt", "b"), ("a.txt", "a")])
        .await;

    let view = app.stowage.resolve_folder(&ctx, docs.id).await.unwrap();
    assert_eq!(view.parent.as_ref().map(|p| p.id), Some(root.id));
    let folders: Vec<&str> = view.subfolders.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(folders, vec!["Alpha", "Zeta"]);
    let files: Vec<&str> = view.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(files, vec!["a.txt", "b.txt"]);

    let listed = app.stowage.list_subfolders(&ctx, docs.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    let listed = app.stowage.list_files(&ctx, docs.id).await.unwrap();
    assert_eq!(listed.len(), 2);

    let landing = app.stowage.resolve_root(&ctx).await.unwrap();
    assert_eq!(landing.folder.id, root.id);
    assert_eq!(landing.subfolders.len(), 1);
}

#[tokio::test]
async fn test_rename_folder_touches_parent_and_protects_root() {
    let app = helpers::TestApp::new().await;
    let (ctx, root) = app.owner().await;
    let drafts = app.mkdir(&ctx, root.id, "Drafts").await;
    let before = app.stowage.resolve_root(&ctx).await.unwrap().folder;

    let renamed = app
        .stowage
        .rename_entry(&ctx, drafts.id.into_uuid(), EntryKind::Folder, "Final")
        .await
        .unwrap();
    assert_eq!(renamed.name(), "Final");
    let after = app.stowage.resolve_root(&ctx).await.unwrap().folder;
    assert!(after.updated_at > before.updated_at);

    let err = app
        .stowage
        .rename_entry(&ctx, root.id.into_uuid(), EntryKind::Folder, "Home")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::ProtectedEntity);

    let err = app
        .stowage
        .rename_entry(&ctx, drafts.id.into_uuid(), EntryKind::Folder, "a/b")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_rename_file_changes_only_name_and_timestamp() {
    let app = helpers::TestApp::new().await;
    let (ctx, root) = app.owner().await;
    let outcomes = app.upload(&ctx, root.id, &[("notes.txt", "hello")]).await;
    let id = outcomes[0].committed().unwrap().id;
    let before = app.stowage.get_file(&ctx, id).await.unwrap();

    let renamed = app
        .stowage
        .rename_entry(&ctx, id.into_uuid(), EntryKind::File, "journal.txt")
        .await
        .unwrap();
    let Entry::File(after) = renamed else {
        panic!("expected a file entry");
    };

    assert_eq!(after.name, "journal.txt");
    assert!(after.updated_at > before.updated_at);
    assert_eq!(after.id, before.id);
    assert_eq!(after.folder_id, before.folder_id);
    assert_eq!(after.storage_path, before.storage_path);
    assert_eq!(after.size_bytes, before.size_bytes);
    assert_eq!(after.mime_type, before.mime_type);
    assert_eq!(after.created_at, before.created_at);

    let err = app
        .stowage
        .rename_entry(&ctx, FileId::new().into_uuid(), EntryKind::File, "x.txt")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

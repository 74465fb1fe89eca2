//! Folder tree building and ancestor path resolution.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, warn};

use stowage_core::error::{AppError, ErrorKind};
use stowage_core::result::AppResult;
use stowage_core::types::FolderId;
use stowage_database::FolderStore;
use stowage_entity::{Folder, FolderNode, PathSegment};

use crate::context::OwnerContext;

/// Builds folder trees and resolves ancestor paths from one bulk load.
#[derive(Debug, Clone)]
pub struct TreeService {
    /// Folder store.
    folders: Arc<dyn FolderStore>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(folders: Arc<dyn FolderStore>) -> Self {
        Self { folders }
    }

    /// Builds the owner's complete folder tree, anchored at the root.
    pub async fn build_tree(&self, ctx: &OwnerContext) -> AppResult<FolderNode> {
        let all = self.folders.find_all_by_owner(ctx.owner_id).await?;
        assemble_tree(all).inspect_err(|e| {
            error!(owner_id = %ctx.owner_id, error = %e, "Folder tree is corrupted");
        })
    }

    /// The chain of folders from the root down to `folder_id`, inclusive.
    pub async fn ancestor_path(
        &self,
        ctx: &OwnerContext,
        folder_id: FolderId,
    ) -> AppResult<Vec<PathSegment>> {
        let all = self.folders.find_all_by_owner(ctx.owner_id).await?;
        trace_ancestors(&all, folder_id).inspect_err(|e| {
            if e.is(ErrorKind::Integrity) {
                error!(owner_id = %ctx.owner_id, folder_id = %folder_id, error = %e, "Parent chain is corrupted");
            }
        })
    }
}

/// Walk parent links from `folder_id` up to the root over an owner's
/// folder set, returning the chain root-first.
///
/// More hops than there are folders means the chain loops.
pub fn trace_ancestors(folders: &[Folder], folder_id: FolderId) -> AppResult<Vec<PathSegment>> {
    let by_id: HashMap<FolderId, &Folder> = folders.iter().map(|f| (f.id, f)).collect();

    let mut current = *by_id
        .get(&folder_id)
        .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
    let mut path = vec![PathSegment::from(current)];

    while let Some(parent_id) = current.parent_id {
        if path.len() > folders.len() {
            return Err(AppError::integrity(format!(
                "Parent chain of folder {folder_id} does not reach the root"
            )));
        }
        let child_id = current.id;
        current = *by_id.get(&parent_id).ok_or_else(|| {
            AppError::integrity(format!("Folder {child_id} has a dangling parent"))
        })?;
        path.push(PathSegment::from(current));
    }

    path.reverse();
    Ok(path)
}

/// Assemble a root-anchored tree from an owner's flat folder set.
///
/// Folders are grouped by parent once, then expanded from the root; each
/// group is consumed when expanded so every folder is visited at most once.
/// Children are ordered by name.
pub fn assemble_tree(folders: Vec<Folder>) -> AppResult<FolderNode> {
    let mut by_parent: HashMap<Option<FolderId>, Vec<Folder>> = HashMap::new();
    for folder in folders {
        by_parent.entry(folder.parent_id).or_default().push(folder);
    }

    let mut roots = by_parent.remove(&None).unwrap_or_default();
    if roots.len() > 1 {
        return Err(AppError::integrity(format!(
            "Owner has {} root folders",
            roots.len()
        )));
    }
    let root = roots
        .pop()
        .ok_or_else(|| AppError::integrity("Owner has no root folder"))?;

    let tree = expand(root, &mut by_parent);

    let unreachable: usize = by_parent.values().map(Vec::len).sum();
    if unreachable > 0 {
        warn!(unreachable, "Folders not reachable from the root were left out of the tree");
    }
    Ok(tree)
}

/// Build the subtree under `root` without recursing per level.
///
/// A pre-order walk records each folder with the slot of its parent
/// (slot 0 is the root, slot `k` is `order[k - 1]`). Walking that list
/// backwards then finishes every node after all of its descendants.
fn expand(root: Folder, by_parent: &mut HashMap<Option<FolderId>, Vec<Folder>>) -> FolderNode {
    let mut order: Vec<(Folder, usize)> = Vec::new();
    let mut pending = children_of(root.id, 0, by_parent);
    while let Some((folder, parent)) = pending.pop() {
        let id = folder.id;
        order.push((folder, parent));
        pending.extend(children_of(id, order.len(), by_parent));
    }

    let mut built: Vec<Vec<FolderNode>> = (0..=order.len()).map(|_| Vec::new()).collect();
    for (index, (folder, parent)) in order.into_iter().enumerate().rev() {
        let mut children = std::mem::take(&mut built[index + 1]);
        children.reverse();
        built[parent].push(FolderNode { folder, children });
    }

    let mut children = std::mem::take(&mut built[0]);
    children.reverse();
    FolderNode {
        folder: root,
        children,
    }
}

/// Children of `id` tagged with their parent's slot, sorted so that
/// popping yields them by name.
fn children_of(
    id: FolderId,
    slot: usize,
    by_parent: &mut HashMap<Option<FolderId>, Vec<Folder>>,
) -> Vec<(Folder, usize)> {
    let mut children = by_parent.remove(&Some(id)).unwrap_or_default();
    children.sort_by(|a, b| b.name.cmp(&a.name));
    children.into_iter().map(|c| (c, slot)).collect()
}

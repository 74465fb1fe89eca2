//! Folder tree structures for hierarchical display.

use serde::{Deserialize, Serialize};

use stowage_core::types::FolderId;

use super::model::Folder;

/// A node in an owner's folder tree.
///
/// Built in memory from the flat folder set; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderNode {
    /// The folder at this node.
    #[serde(flatten)]
    pub folder: Folder,
    /// Child folder nodes, ordered by name.
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Create a leaf node.
    pub fn leaf(folder: Folder) -> Self {
        Self {
            folder,
            children: Vec::new(),
        }
    }

    /// Total number of folders in this subtree, including this node.
    pub fn count(&self) -> usize {
        self.descendants().count()
    }

    /// Length of the longest path from this node to a leaf (a leaf is 0).
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut pending = vec![(self, 0usize)];
        while let Some((node, depth)) = pending.pop() {
            height = height.max(depth);
            pending.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        height
    }

    /// Names of every descendant in depth-first display order, excluding
    /// this node's own name.
    pub fn flatten_names(&self) -> Vec<String> {
        self.descendants()
            .skip(1)
            .map(|node| node.folder.name.clone())
            .collect()
    }

    /// Find the node for `id` within this subtree.
    pub fn find(&self, id: FolderId) -> Option<&FolderNode> {
        self.descendants().find(|node| node.folder.id == id)
    }

    /// Pre-order walk of this subtree, starting with this node.
    pub fn descendants(&self) -> impl Iterator<Item = &FolderNode> {
        let mut pending = vec![self];
        std::iter::from_fn(move || {
            let node = pending.pop()?;
            pending.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

impl Drop for FolderNode {
    // Unlinks the subtree level by level so dropping a deep chain does not
    // recurse once per level.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use stowage_core::types::{FolderId, OwnerId};

/// A folder in an owner's hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// The owning account.
    pub owner_id: OwnerId,
    /// Folder name, unique among its siblings.
    pub name: String,
    /// Parent folder ID (null only for the root folder).
    pub parent_id: Option<FolderId>,
    /// Whether this is the owner's root folder.
    pub is_root: bool,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder or something beneath it last changed.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// The root folder is the only one that may never be renamed or deleted.
    pub fn is_protected(&self) -> bool {
        self.is_root
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// The owning account.
    pub owner_id: OwnerId,
    /// Parent folder (None for the root).
    pub parent_id: Option<FolderId>,
    /// Folder name.
    pub name: String,
    /// Whether the folder is the owner's root.
    pub is_root: bool,
}

impl CreateFolder {
    /// Describe the root folder of an owner.
    pub fn root(owner_id: OwnerId, name: impl Into<String>) -> Self {
        Self {
            owner_id,
            parent_id: None,
            name: name.into(),
            is_root: true,
        }
    }

    /// Describe a subfolder beneath `parent_id`.
    pub fn child(owner_id: OwnerId, parent_id: FolderId, name: impl Into<String>) -> Self {
        Self {
            owner_id,
            parent_id: Some(parent_id),
            name: name.into(),
            is_root: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_descriptor_has_no_parent() {
        let owner = OwnerId::new();
        let root = CreateFolder::root(owner, "Root Folder");
        assert!(root.is_root);
        assert!(root.parent_id.is_none());

        let parent = FolderId::new();
        let child = CreateFolder::child(owner, parent, "Reports");
        assert!(!child.is_root);
        assert_eq!(child.parent_id, Some(parent));
    }
}

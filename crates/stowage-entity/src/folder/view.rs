//! Read-side projections of a single folder.

use serde::{Deserialize, Serialize};

use stowage_core::types::FolderId;

use super::model::Folder;
use crate::file::File;

/// One step of an ancestor chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSegment {
    /// Folder ID.
    pub id: FolderId,
    /// Folder name.
    pub name: String,
}

impl From<&Folder> for PathSegment {
    fn from(folder: &Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name.clone(),
        }
    }
}

/// A folder together with its immediate surroundings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderView {
    /// The folder itself.
    pub folder: Folder,
    /// Its parent, if it is not the root.
    pub parent: Option<PathSegment>,
    /// Direct subfolders ordered by name.
    pub subfolders: Vec<Folder>,
    /// Direct files ordered by name.
    pub files: Vec<File>,
}

impl FolderView {
    /// Whether the folder has neither subfolders nor files.
    pub fn is_empty(&self) -> bool {
        self.subfolders.is_empty() && self.files.is_empty()
    }
}

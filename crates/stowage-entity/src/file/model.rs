//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use stowage_core::types::{FileId, FolderId, OwnerId};

/// A file attached to a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: FileId,
    /// The owning account.
    pub owner_id: OwnerId,
    /// The folder containing this file.
    pub folder_id: FolderId,
    /// The original file name (including extension).
    pub name: String,
    /// Blob path relative to the blob store root.
    pub storage_path: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// MIME type claimed at upload.
    pub mime_type: String,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// The file owner.
    pub owner_id: OwnerId,
    /// The folder to place the file in.
    pub folder_id: FolderId,
    /// The file name.
    pub name: String,
    /// Blob path (the staging path until the commit finalizes it).
    pub storage_path: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: String,
}

/// Summary of a committed upload returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommittedFile {
    /// File ID.
    pub id: FileId,
    /// Original file name.
    pub name: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl From<&File> for CommittedFile {
    fn from(file: &File) -> Self {
        Self {
            id: file.id,
            name: file.name.clone(),
            size_bytes: file.size_bytes,
            mime_type: file.mime_type.clone(),
            created_at: file.created_at,
        }
    }
}

//! Entry kinds addressed by rename and delete.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use stowage_core::error::AppError;
use stowage_entity::{File, Folder};

/// Whether an entry id names a folder or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A folder.
    Folder,
    /// A file.
    File,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Folder => write!(f, "folder"),
            Self::File => write!(f, "file"),
        }
    }
}

impl FromStr for EntryKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "folder" | "dir" => Ok(Self::Folder),
            "file" => Ok(Self::File),
            other => Err(AppError::validation(format!("Unknown entry kind: {other}"))),
        }
    }
}

/// An entry returned by a rename.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entry {
    /// A renamed folder.
    Folder(Folder),
    /// A renamed file.
    File(File),
}

impl Entry {
    /// The entry's current name.
    pub fn name(&self) -> &str {
        match self {
            Self::Folder(folder) => &folder.name,
            Self::File(file) => &file.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry_kind() {
        assert_eq!("folder".parse::<EntryKind>().unwrap(), EntryKind::Folder);
        assert_eq!("FILE".parse::<EntryKind>().unwrap(), EntryKind::File);
        assert!("link".parse::<EntryKind>().is_err());
    }
}

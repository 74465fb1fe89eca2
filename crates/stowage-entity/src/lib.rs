//! # stowage-entity
//!
//! Domain entity models for Stowage. `Folder` and `File` mirror the two
//! metadata tables and derive `sqlx::FromRow`; the remaining types are
//! read-side projections (`FolderNode`, `FolderView`, `PathSegment`) and
//! values exchanged between the engine and the stores (`DeletionPlan`).

pub mod file;
pub mod folder;

pub use file::{CommittedFile, CreateFile, File};
pub use folder::{CreateFolder, DeletionPlan, Folder, FolderNode, FolderView, PathSegment};

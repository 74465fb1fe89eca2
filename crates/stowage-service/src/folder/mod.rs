//! Folder operations of the hierarchy engine.

pub mod delete;
pub mod service;
pub mod tree;

pub use delete::{DeletionService, DeletionSummary};
pub use service::FolderService;
pub use tree::TreeService;

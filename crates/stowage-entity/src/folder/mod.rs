//! Folder domain entities.

pub mod deletion;
pub mod model;
pub mod tree;
pub mod view;

pub use deletion::DeletionPlan;
pub use model::{CreateFolder, Folder};
pub use tree::FolderNode;
pub use view::{FolderView, PathSegment};

//! # stowage-service
//!
//! The hierarchy engine, upload commit pipeline, and access facade.
//!
//! Services receive their stores at construction time as `Arc<dyn ...>`
//! handles and never reach for ambient state. Every operation takes the
//! caller's [`OwnerContext`] and is scoped to that owner.

pub mod access;
pub mod blob;
pub mod context;
pub mod entry;
pub mod file;
pub mod folder;
pub mod validation;

pub use access::{HealthReport, Outcome, Stowage};
pub use context::OwnerContext;
pub use entry::{Entry, EntryKind};
pub use file::{DownloadService, FileDownload, FileService, IncomingFile, UploadOutcome, UploadService};
pub use folder::{DeletionService, DeletionSummary, FolderService, TreeService};

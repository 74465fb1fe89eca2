//! # stowage-database
//!
//! The metadata store boundary. [`FolderStore`] and [`FileStore`] are the
//! traits the hierarchy engine depends on; [`repositories`] implements
//! them over PostgreSQL and [`memory`] implements them in-process with the
//! same uniqueness and referential constraints.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryMetadataStore;
pub use repositories::{FileRepository, FolderRepository};
pub use store::{FileStore, FolderStore};

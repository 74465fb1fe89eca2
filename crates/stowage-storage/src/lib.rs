//! # stowage-storage
//!
//! Blob storage for Stowage. [`providers::local`] implements the
//! [`BlobStore`](stowage_core::traits::BlobStore) trait on the local
//! filesystem, and [`layout`] decides where each owner's blobs live.

pub mod layout;
pub mod mime;
pub mod providers;

pub use providers::local::LocalBlobStore;

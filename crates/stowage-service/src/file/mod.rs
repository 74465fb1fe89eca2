//! File operations and the upload commit pipeline.

pub mod download;
pub mod service;
pub mod upload;

pub use download::{DownloadService, FileDownload};
pub use service::FileService;
pub use upload::{IncomingFile, UploadOutcome, UploadService};

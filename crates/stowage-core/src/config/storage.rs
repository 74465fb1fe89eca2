//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Blob store and upload pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory under which every owner gets its own blob directory.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Maximum size of a single uploaded file in bytes (default 100 MiB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Name given to the root folder at provisioning time.
    #[serde(default = "default_root_folder_name")]
    pub root_folder_name: String,
    /// Upper bound for a single blob operation in seconds.
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            max_upload_size_bytes: default_max_upload(),
            root_folder_name: default_root_folder_name(),
            operation_timeout_seconds: default_operation_timeout(),
        }
    }
}

fn default_root_path() -> String {
    "./data/uploads".to_string()
}

fn default_max_upload() -> u64 {
    104_857_600 // 100 MiB
}

fn default_root_folder_name() -> String {
    "Root Folder".to_string()
}

fn default_operation_timeout() -> u64 {
    30
}

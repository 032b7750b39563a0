//! Blob storage configuration.

use serde::{Deserialize, Serialize};

/// Which blob provider stores file payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobProvider {
    /// Local filesystem under `root_path`.
    #[default]
    Local,
    /// Process-local map; intended for tests.
    Memory,
}

/// Blob storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Selected provider.
    #[serde(default)]
    pub provider: BlobProvider,
    /// Root path for local blob storage.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Maximum upload size in bytes (default 100 MB).
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: BlobProvider::default(),
            root_path: default_root_path(),
            max_upload_size_bytes: default_max_upload(),
        }
    }
}

fn default_root_path() -> String {
    "./data/blobs".to_string()
}

fn default_max_upload() -> u64 {
    104_857_600 // 100 MB
}

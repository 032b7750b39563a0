//! # citrus-storage
//!
//! Blob store providers for CitrusNotes file payloads. Supports the local
//! filesystem and a process-local memory store.

pub mod mime;
pub mod providers;

use std::sync::Arc;

use tracing::info;

use citrus_core::config::{BlobProvider, StorageConfig};
use citrus_core::result::AppResult;
use citrus_core::traits::BlobStore;

pub use mime::guess_content_type;
pub use providers::{LocalBlobStore, MemoryBlobStore};

/// Build the configured blob store.
pub async fn build_blob_store(config: &StorageConfig) -> AppResult<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.provider {
        BlobProvider::Local => Arc::new(LocalBlobStore::new(&config.root_path).await?),
        BlobProvider::Memory => Arc::new(MemoryBlobStore::new()),
    };
    info!(provider = store.provider_type(), "Blob store ready");
    Ok(store)
}

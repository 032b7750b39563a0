//! Blob store trait for the binary payload collaborator.

use async_trait::async_trait;
use bytes::Bytes;

use crate::result::AppResult;

/// Trait for binary payload backends.
///
/// Metadata rows reference blobs by an opaque key. Deletion is two-phase so
/// that a cascading delete can be rolled back: a blob is first *retired*
/// (hidden but recoverable), then either *restored* or *purged*.
#[async_trait]
pub trait BlobStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Store a payload under the given key. Returns the number of bytes written.
    async fn put(&self, key: &str, data: Bytes) -> AppResult<u64>;

    /// Read a live payload.
    async fn get(&self, key: &str) -> AppResult<Bytes>;

    /// Remove a live payload immediately. Missing keys are not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Move a live payload out of reach without destroying it.
    async fn retire(&self, key: &str) -> AppResult<()>;

    /// Bring a retired payload back to life.
    async fn restore(&self, key: &str) -> AppResult<()>;

    /// Destroy a retired payload.
    async fn purge(&self, key: &str) -> AppResult<()>;
}

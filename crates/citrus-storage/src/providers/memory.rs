//! In-memory blob store.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use citrus_core::error::AppError;
use citrus_core::result::AppResult;
use citrus_core::traits::BlobStore;

use super::validate_key;

/// Process-local blob store. Payloads vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    live: DashMap<String, Bytes>,
    retired: DashMap<String, Bytes>,
    fail_retire: AtomicBool,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live blobs.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of retired, not yet purged blobs.
    pub fn retired_count(&self) -> usize {
        self.retired.len()
    }

    /// Whether a live blob exists under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.live.contains_key(key)
    }

    /// Make every subsequent `retire` fail, simulating an unavailable backend.
    pub fn set_fail_retire(&self, fail: bool) {
        self.fail_retire.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn put(&self, key: &str, data: Bytes) -> AppResult<u64> {
        validate_key(key)?;
        let len = data.len() as u64;
        self.live.insert(key.to_string(), data);
        Ok(len)
    }

    async fn get(&self, key: &str) -> AppResult<Bytes> {
        self.live
            .get(key)
            .map(|b| b.value().clone())
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {key}")))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.live.remove(key);
        Ok(())
    }

    async fn retire(&self, key: &str) -> AppResult<()> {
        if self.fail_retire.load(Ordering::SeqCst) {
            return Err(AppError::storage(format!("Blob store unavailable: {key}")));
        }
        if let Some((key, data)) = self.live.remove(key) {
            self.retired.insert(key, data);
        }
        Ok(())
    }

    async fn restore(&self, key: &str) -> AppResult<()> {
        if let Some((key, data)) = self.retired.remove(key) {
            self.live.insert(key, data);
        }
        Ok(())
    }

    async fn purge(&self, key: &str) -> AppResult<()> {
        self.retired.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_two_phase_delete() {
        let store = MemoryBlobStore::new();
        store.put("a", Bytes::from("1")).await.unwrap();
        store.put("b", Bytes::from("2")).await.unwrap();

        store.retire("a").await.unwrap();
        store.retire("b").await.unwrap();
        assert_eq!(store.live_count(), 0);
        assert_eq!(store.retired_count(), 2);

        store.restore("a").await.unwrap();
        store.purge("b").await.unwrap();
        assert!(store.contains("a"));
        assert!(!store.contains("b"));
        assert_eq!(store.retired_count(), 0);
    }

    #[tokio::test]
    async fn test_fail_retire_keeps_blob_live() {
        let store = MemoryBlobStore::new();
        store.put("c", Bytes::from("3")).await.unwrap();
        store.set_fail_retire(true);
        assert!(store.retire("c").await.is_err());
        assert!(store.contains("c"));
    }
}

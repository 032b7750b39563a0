//! Local filesystem blob store.
//!
//! Live blobs sit directly under the root; retired blobs are moved into
//! `<root>/.trash/` until they are restored or purged.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use citrus_core::error::{AppError, ErrorKind};
use citrus_core::result::AppResult;
use citrus_core::traits::BlobStore;

use super::validate_key;

const TRASH_DIR: &str = ".trash";

/// Blob store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    trash: PathBuf,
}

impl LocalBlobStore {
    /// Create a store rooted at `root_path`, creating directories as needed.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        let trash = root.join(TRASH_DIR);
        fs::create_dir_all(&trash).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create blob root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root, trash })
    }

    fn live_path(&self, key: &str) -> AppResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    fn trash_path(&self, key: &str) -> AppResult<PathBuf> {
        validate_key(key)?;
        Ok(self.trash.join(key))
    }

    /// Move `from` to `to`. A missing source is a no-op.
    async fn relocate(&self, from: &Path, to: &Path, action: &str, key: &str) -> AppResult<()> {
        match fs::rename(from, to).await {
            Ok(()) => {
                debug!(key, action, "Relocated blob");
                Ok(())
            }
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to {action} blob: {key}"),
                e,
            )),
        }
    }
}

async fn remove_if_present(path: &Path, key: &str) -> AppResult<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to remove blob: {key}"),
            e,
        )),
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.trash)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn put(&self, key: &str, data: Bytes) -> AppResult<u64> {
        let path = self.live_path(key)?;
        let mut file = fs::File::create(&path).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to create blob: {key}"), e)
        })?;
        file.write_all(&data).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, format!("Failed to write blob: {key}"), e)
        })?;
        file.flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to flush blob", e))?;

        debug!(key, bytes = data.len(), "Stored blob");
        Ok(data.len() as u64)
    }

    async fn get(&self, key: &str) -> AppResult<Bytes> {
        let path = self.live_path(key)?;
        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == IoErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {key}"))
            } else {
                AppError::with_source(ErrorKind::Storage, format!("Failed to read blob: {key}"), e)
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        remove_if_present(&self.live_path(key)?, key).await
    }

    async fn retire(&self, key: &str) -> AppResult<()> {
        let (live, trash) = (self.live_path(key)?, self.trash_path(key)?);
        self.relocate(&live, &trash, "retire", key).await
    }

    async fn restore(&self, key: &str) -> AppResult<()> {
        let (live, trash) = (self.live_path(key)?, self.trash_path(key)?);
        self.relocate(&trash, &live, "restore", key).await
    }

    async fn purge(&self, key: &str) -> AppResult<()> {
        remove_if_present(&self.trash_path(key)?, key).await
    }
}

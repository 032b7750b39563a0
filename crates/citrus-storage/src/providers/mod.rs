//! Blob store provider implementations.

pub mod local;
pub mod memory;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

use citrus_core::error::AppError;
use citrus_core::result::AppResult;

/// Reject keys that could escape the provider's namespace.
pub(crate) fn validate_key(key: &str) -> AppResult<()> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(AppError::validation(format!("Invalid blob key: {key:?}")))
    }
}

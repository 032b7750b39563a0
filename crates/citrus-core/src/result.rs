//! Convenience result type alias for CitrusNotes.

use crate::error::AppError;

/// A specialized `Result` type for file-system store operations.
pub type AppResult<T> = Result<T, AppError>;

//! Typed path parameter helpers.

use citrus_core::error::AppError;
use citrus_core::types::EntryId;

/// Parses an entry id from a path segment.
pub fn parse_entry_id(s: &str) -> Result<EntryId, AppError> {
    s.parse::<EntryId>()
        .map_err(|_| AppError::validation(format!("Invalid entry id: {s}")))
}

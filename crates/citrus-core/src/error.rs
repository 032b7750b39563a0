//! Unified application error types for CitrusNotes.
//!
//! Every store operation fails with an [`AppError`] whose [`ErrorKind`]
//! tells the caller which invariant was violated. Errors from cascading
//! operations carry the id of the entry that caused the failure.

use std::fmt;
use thiserror::Error;

use crate::types::id::EntryId;

/// Error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The referenced entry does not exist or is not owned by the caller.
    NotFound,
    /// The parent is missing, not a folder, or owned by a different user.
    InvalidParent,
    /// The name is empty or whitespace only.
    InvalidName,
    /// The move would make an entry its own ancestor.
    CyclicMove,
    /// The tag is already present on the entry (case-insensitive).
    DuplicateTag,
    /// The entry carries no tags to remove.
    TagNotFound,
    /// Any other input validation failure.
    Validation,
    /// The caller identity is missing or malformed.
    Unauthorized,
    /// A database error occurred.
    Database,
    /// A blob storage error occurred.
    Storage,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether this kind reports a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound | Self::TagNotFound)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::InvalidParent => write!(f, "INVALID_PARENT"),
            Self::InvalidName => write!(f, "INVALID_NAME"),
            Self::CyclicMove => write!(f, "CYCLIC_MOVE"),
            Self::DuplicateTag => write!(f, "DUPLICATE_TAG"),
            Self::TagNotFound => write!(f, "TAG_NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Unauthorized => write!(f, "UNAUTHORIZED"),
            Self::Database => write!(f, "DATABASE"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error.
///
/// Crate-specific errors are mapped into `AppError` with `From` impls
/// or explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// The entry the failure is attributed to, if any.
    pub entry_id: Option<EntryId>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            entry_id: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            entry_id: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attribute this error to a specific entry.
    pub fn for_entry(mut self, entry_id: EntryId) -> Self {
        self.entry_id = Some(entry_id);
        self
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an invalid-parent error.
    pub fn invalid_parent(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParent, message)
    }

    /// Create an invalid-name error.
    pub fn invalid_name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidName, message)
    }

    /// Create a cyclic-move error.
    pub fn cyclic_move(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CyclicMove, message)
    }

    /// Create a duplicate-tag error.
    pub fn duplicate_tag(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateTag, message)
    }

    /// Create a tag-not-found error.
    pub fn tag_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TagNotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            entry_id: self.entry_id,
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

//! Entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use citrus_core::types::{EntryId, OwnerId};

use super::tags::TagSet;

/// Reference to the binary payload of a file.
///
/// Populated when the file is created or uploaded and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef {
    /// Opaque key understood by the blob store.
    pub blob_key: String,
    /// MIME type of the payload.
    pub content_type: String,
    /// Payload size in bytes.
    pub size_bytes: u64,
}

/// A file or folder in a user's virtual file system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique, immutable identifier.
    pub id: EntryId,
    /// The user owning this entry.
    pub owner_id: OwnerId,
    /// Display name. Never empty; not unique within a folder.
    pub name: String,
    /// Whether this entry is a folder.
    pub is_folder: bool,
    /// Containing folder (None for root-level entries).
    pub parent_id: Option<EntryId>,
    /// Whether the owner starred this entry.
    pub is_starred: bool,
    /// Lowercase tags.
    pub tags: TagSet,
    /// Payload reference (files only).
    pub content: Option<ContentRef>,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// When the entry metadata last changed.
    pub updated_at: DateTime<Utc>,
}

impl Entry {
    /// Materialize a validated creation request into a new entry.
    pub fn create(data: NewEntry) -> Self {
        let now = Utc::now();
        Self {
            id: EntryId::new(),
            owner_id: data.owner_id,
            name: data.name,
            is_folder: data.is_folder,
            parent_id: data.parent_id,
            is_starred: data.is_starred,
            tags: data.tags,
            content: data.content,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this entry sits at the root level.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Payload size in bytes (0 for folders and empty files).
    pub fn size_bytes(&self) -> u64 {
        self.content.as_ref().map_or(0, |c| c.size_bytes)
    }

    /// Record a metadata mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Data required to create a new entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntry {
    /// The owning user.
    pub owner_id: OwnerId,
    /// Display name.
    pub name: String,
    /// Whether to create a folder.
    pub is_folder: bool,
    /// Parent folder (None for root).
    pub parent_id: Option<EntryId>,
    /// Initial tags.
    #[serde(default)]
    pub tags: TagSet,
    /// Initial star flag.
    #[serde(default)]
    pub is_starred: bool,
    /// Payload reference for files.
    #[serde(default)]
    pub content: Option<ContentRef>,
}

impl NewEntry {
    /// A folder creation request.
    pub fn folder(owner_id: OwnerId, name: impl Into<String>, parent_id: Option<EntryId>) -> Self {
        Self {
            owner_id,
            name: name.into(),
            is_folder: true,
            parent_id,
            tags: TagSet::default(),
            is_starred: false,
            content: None,
        }
    }

    /// A file creation request without payload.
    pub fn file(owner_id: OwnerId, name: impl Into<String>, parent_id: Option<EntryId>) -> Self {
        Self {
            is_folder: false,
            ..Self::folder(owner_id, name, parent_id)
        }
    }

    /// Attach initial tags.
    pub fn with_tags(mut self, tags: TagSet) -> Self {
        self.tags = tags;
        self
    }

    /// Attach a payload reference.
    pub fn with_content(mut self, content: ContentRef) -> Self {
        self.content = Some(content);
        self
    }

    /// Mark the entry starred at creation.
    pub fn starred(mut self) -> Self {
        self.is_starred = true;
        self
    }
}

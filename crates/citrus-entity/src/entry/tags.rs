//! Case-insensitive tag set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use citrus_core::error::AppError;
use citrus_core::result::AppResult;

/// Normalize a raw tag: trimmed and lowercased.
///
/// Fails with a validation error for empty or whitespace-only tags.
pub fn normalize_tag(raw: &str) -> AppResult<String> {
    let tag = raw.trim().to_lowercase();
    if tag.is_empty() {
        return Err(AppError::validation("Tag cannot be empty"));
    }
    Ok(tag)
}

/// A set of lowercase tags, unique under case-insensitive comparison.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    /// Build a set from raw tags, silently folding case-insensitive duplicates.
    pub fn normalized<I, S>(raw: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for tag in raw {
            set.insert(normalize_tag(tag.as_ref())?);
        }
        Ok(Self(set))
    }

    /// Add a tag. Fails with `DuplicateTag` if it is already present.
    pub fn insert(&mut self, raw: &str) -> AppResult<()> {
        let tag = normalize_tag(raw)?;
        if self.0.contains(&tag) {
            return Err(AppError::duplicate_tag(format!("Tag '{tag}' already exists")));
        }
        self.0.insert(tag);
        Ok(())
    }

    /// Remove a tag. Returns whether it was present.
    pub fn remove(&mut self, raw: &str) -> bool {
        self.0.remove(&raw.trim().to_lowercase())
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, raw: &str) -> bool {
        self.0.contains(&raw.trim().to_lowercase())
    }

    /// Whether every tag of `required` is present.
    pub fn contains_all(&self, required: &TagSet) -> bool {
        required.0.is_subset(&self.0)
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the tags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Copy the tags into a vector.
    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl TryFrom<Vec<String>> for TagSet {
    type Error = AppError;

    fn try_from(raw: Vec<String>) -> Result<Self, Self::Error> {
        Self::normalized(raw)
    }
}

impl From<TagSet> for Vec<String> {
    fn from(tags: TagSet) -> Self {
        tags.0.into_iter().collect()
    }
}

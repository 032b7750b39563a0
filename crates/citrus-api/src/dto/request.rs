//! Request DTOs with validation.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use citrus_core::error::AppError;
use citrus_core::result::AppResult;
use citrus_core::types::EntryId;
use citrus_entity::entry::TagSet;
use citrus_service::CreateEntryRequest;

use crate::error::ApiError;

/// JSON body that has passed its `validator` rules.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(format!("Invalid JSON body: {}", e.body_text())))?;
        value
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        Ok(Self(value))
    }
}

/// Create entry request body.
///
/// Payloads are attached only through the upload endpoint, so unknown
/// fields such as `content` are rejected.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateEntryBody {
    /// Display name.
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: String,
    /// Whether to create a folder.
    #[serde(default)]
    pub is_folder: bool,
    /// Parent folder (omit or null for root).
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Initial tags.
    #[serde(default)]
    #[validate(length(max = 64, message = "At most 64 tags"))]
    pub tags: Vec<String>,
    /// Initial star flag.
    #[serde(default)]
    pub is_starred: bool,
}

impl From<CreateEntryBody> for CreateEntryRequest {
    fn from(body: CreateEntryBody) -> Self {
        Self {
            name: body.name,
            is_folder: body.is_folder,
            parent_id: body.parent_id.map(EntryId::from_uuid),
            tags: body.tags,
            is_starred: body.is_starred,
        }
    }
}

/// Rename request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenameBody {
    /// New display name.
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: String,
}

/// Move request body. A null or missing parent moves to the root level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveBody {
    /// Target folder.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

/// Star toggle request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarBody {
    /// Desired star state.
    pub starred: bool,
}

/// Add tag request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TagBody {
    /// Tag to add, any casing.
    #[validate(length(min = 1, max = 64, message = "Tag must be 1-64 characters"))]
    pub tag: String,
}

/// Query parameters of `GET /api/entries`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListEntriesQuery {
    /// Parent folder; omitted for the root level.
    pub parent_id: Option<Uuid>,
    /// Comma-separated tags that every returned entry must carry.
    pub tags: Option<String>,
}

impl ListEntriesQuery {
    /// Parsed tag filter.
    pub fn tag_filter(&self) -> AppResult<TagSet> {
        match self.tags.as_deref() {
            None => Ok(TagSet::default()),
            Some(raw) => TagSet::normalized(raw.split(',').filter(|t| !t.trim().is_empty())),
        }
    }

    /// Parent as a typed id.
    pub fn parent(&self) -> Option<EntryId> {
        self.parent_id.map(EntryId::from_uuid)
    }
}

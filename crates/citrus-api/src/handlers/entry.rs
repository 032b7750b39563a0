//! Entry handlers: listing, CRUD, move, star, tags, upload and download.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;

use citrus_core::error::AppError;
use citrus_core::types::EntryId;
use citrus_service::UploadFileRequest;

use crate::dto::request::{
    CreateEntryBody, ListEntriesQuery, MoveBody, RenameBody, StarBody, TagBody, ValidatedJson,
};
use crate::dto::response::DeleteResponse;
use crate::error::ApiResult;
use crate::extractors::{Owner, parse_entry_id};
use crate::state::AppState;

/// GET /api/entries
pub async fn list_entries(
    State(state): State<AppState>,
    owner: Owner,
    Query(query): Query<ListEntriesQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let tags = query.tag_filter()?;
    let entries = state
        .entry_service
        .list_children(&owner, query.parent(), &tags)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": entries })))
}

/// POST /api/entries
pub async fn create_entry(
    State(state): State<AppState>,
    owner: Owner,
    ValidatedJson(body): ValidatedJson<CreateEntryBody>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let entry = state.entry_service.create_entry(&owner, body.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": entry })),
    ))
}

/// POST /api/entries/upload
///
/// Multipart fields: `file` (required), `parent_id`, `tags` (comma-separated).
pub async fn upload_file(
    State(state): State<AppState>,
    owner: Owner,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let mut parent_id: Option<EntryId> = None;
    let mut tags: Vec<String> = Vec::new();
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "parent_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                if !text.trim().is_empty() {
                    parent_id = Some(parse_entry_id(text.trim())?);
                }
            }
            "tags" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                tags.extend(
                    text.split(',')
                        .map(str::trim)
                        .filter(|t| !t.is_empty())
                        .map(String::from),
                );
            }
            "file" => {
                file_name = field.file_name().map(String::from);
                content_type = field.content_type().map(String::from);
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| AppError::validation(format!("Read error: {e}")))?,
                );
            }
            _ => {}
        }
    }

    let name = file_name.ok_or_else(|| AppError::validation("file is required"))?;
    let data = data.ok_or_else(|| AppError::validation("file data is required"))?;

    let entry = state
        .entry_service
        .upload_file(
            &owner,
            UploadFileRequest {
                name,
                parent_id,
                tags,
                content_type,
                data,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "success": true, "data": entry })),
    ))
}

/// GET /api/entries/{id}
pub async fn get_entry(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let entry_id = parse_entry_id(&id)?;
    let entry = state.entry_service.get_entry(&owner, entry_id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": entry })))
}

/// GET /api/entries/{id}/content
pub async fn download_content(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let entry_id = parse_entry_id(&id)?;
    let (content, data) = state.entry_service.read_content(&owner, entry_id).await?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content.content_type)
        .header(header::CONTENT_LENGTH, data.len())
        .body(Body::from(data))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;
    Ok(response)
}

/// GET /api/entries/{id}/breadcrumbs
pub async fn breadcrumbs(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let entry_id = parse_entry_id(&id)?;
    let chain = state.entry_service.breadcrumbs(&owner, entry_id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": chain })))
}

/// GET /api/entries/{id}/tree
pub async fn subtree(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let entry_id = parse_entry_id(&id)?;
    let tree = state.entry_service.subtree(&owner, entry_id).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": tree })))
}

/// PUT /api/entries/{id}/name
pub async fn rename_entry(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<RenameBody>,
) -> ApiResult<Json<serde_json::Value>> {
    let entry_id = parse_entry_id(&id)?;
    let entry = state
        .entry_service
        .rename_entry(&owner, entry_id, &body.name)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": entry })))
}

/// PUT /api/entries/{id}/move
pub async fn move_entry(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
    Json(body): Json<MoveBody>,
) -> ApiResult<Json<serde_json::Value>> {
    let entry_id = parse_entry_id(&id)?;
    let entry = state
        .entry_service
        .move_entry(&owner, entry_id, body.parent_id.map(EntryId::from_uuid))
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": entry })))
}

/// PUT /api/entries/{id}/star
pub async fn set_starred(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
    Json(body): Json<StarBody>,
) -> ApiResult<Json<serde_json::Value>> {
    let entry_id = parse_entry_id(&id)?;
    let entry = state
        .entry_service
        .set_starred(&owner, entry_id, body.starred)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": entry })))
}

/// POST /api/entries/{id}/tags
pub async fn add_tag(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<TagBody>,
) -> ApiResult<Json<serde_json::Value>> {
    let entry_id = parse_entry_id(&id)?;
    let entry = state
        .entry_service
        .add_tag(&owner, entry_id, &body.tag)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": entry })))
}

/// DELETE /api/entries/{id}/tags/{tag}
pub async fn remove_tag(
    State(state): State<AppState>,
    owner: Owner,
    Path((id, tag)): Path<(String, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    let entry_id = parse_entry_id(&id)?;
    let entry = state
        .entry_service
        .remove_tag(&owner, entry_id, &tag)
        .await?;
    Ok(Json(serde_json::json!({ "success": true, "data": entry })))
}

/// DELETE /api/entries/{id}
pub async fn delete_entry(
    State(state): State<AppState>,
    owner: Owner,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let entry_id = parse_entry_id(&id)?;
    let removed = state.entry_service.delete_entry(&owner, entry_id).await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": DeleteResponse { removed } }),
    ))
}

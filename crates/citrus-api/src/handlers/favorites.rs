//! Favorites view handler.

use axum::Json;
use axum::extract::State;

use crate::error::ApiResult;
use crate::extractors::Owner;
use crate::state::AppState;

/// GET /api/favorites
pub async fn favorites(
    State(state): State<AppState>,
    owner: Owner,
) -> ApiResult<Json<serde_json::Value>> {
    let forest = state.entry_service.favorites(&owner).await?;
    Ok(Json(serde_json::json!({ "success": true, "data": forest })))
}

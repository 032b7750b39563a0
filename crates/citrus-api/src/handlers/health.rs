//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::{ApiResponse, ComponentHealth, HealthResponse};
use crate::state::AppState;

/// GET /api/health
///
/// Answers 503 when either the entry store or the blob store is down.
pub async fn health(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let service = &state.entry_service;
    let (store_ok, blobs_ok) = match service.health_check().await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (false, false)
        }
    };

    let healthy = store_ok && blobs_ok;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        store: ComponentHealth {
            backend: service.backend().to_string(),
            healthy: store_ok,
        },
        blobs: ComponentHealth {
            backend: service.blob_provider().to_string(),
            healthy: blobs_ok,
        },
    };

    (status, Json(ApiResponse::ok(body)))
}

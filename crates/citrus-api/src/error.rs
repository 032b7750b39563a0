//! Maps domain `AppError` to HTTP responses.
//!
//! `AppError` lives in `citrus-core`, so handlers return the local
//! [`ApiError`] wrapper, which `?` builds from any `AppError`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use citrus_core::error::{AppError, ErrorKind};
use citrus_core::types::EntryId;

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// The entry the failure is attributed to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<EntryId>,
}

/// Handler error: a domain error on its way to becoming a response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Result type returned by handlers and extractors.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// HTTP status for an error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound | ErrorKind::TagNotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidParent | ErrorKind::InvalidName | ErrorKind::Validation => {
            StatusCode::BAD_REQUEST
        }
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::CyclicMove | ErrorKind::DuplicateTag => StatusCode::CONFLICT,
        ErrorKind::Database
        | ErrorKind::Storage
        | ErrorKind::Configuration
        | ErrorKind::Serialization
        | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = status_for(err.kind);
        if status.is_server_error() {
            tracing::error!(
                kind = %err.kind,
                entry_id = ?err.entry_id,
                error = %err.message,
                source = ?err.source,
                "Request failed"
            );
        }

        let body = ApiErrorResponse {
            error: err.kind.to_string(),
            message: err.message,
            entry_id: err.entry_id,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(ErrorKind::TagNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorKind::InvalidParent), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(ErrorKind::CyclicMove), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::DuplicateTag), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorKind::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_for(ErrorKind::Storage),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_body_carries_entry_id() {
        use http_body_util::BodyExt;

        let id = EntryId::new();
        let response = ApiError::from(AppError::storage("disk unavailable").for_entry(id))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ApiErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "STORAGE");
        assert_eq!(body.entry_id, Some(id));
    }

    #[tokio::test]
    async fn test_client_errors_keep_domain_code() {
        use http_body_util::BodyExt;

        let response = ApiError::from(AppError::cyclic_move("into itself")).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ApiErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "CYCLIC_MOVE");
        assert_eq!(body.message, "into itself");
        assert!(body.entry_id.is_none());
    }
}

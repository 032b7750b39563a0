//! Route definitions for the CitrusNotes HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to every handler via Axum's `State` extractor.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let max_upload = usize::try_from(state.config.storage.max_upload_size_bytes)
        .unwrap_or(usize::MAX);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    let api_routes = Router::new()
        .merge(entry_routes())
        .merge(favorites_routes())
        .merge(health_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(timeout_layer(timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Requests running longer than `timeout` are answered with 408.
pub(crate) fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Entry CRUD, tree navigation, tags, upload and download
fn entry_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/entries",
            get(handlers::entry::list_entries).post(handlers::entry::create_entry),
        )
        .route("/entries/upload", post(handlers::entry::upload_file))
        .route(
            "/entries/{id}",
            get(handlers::entry::get_entry).delete(handlers::entry::delete_entry),
        )
        .route("/entries/{id}/content", get(handlers::entry::download_content))
        .route("/entries/{id}/breadcrumbs", get(handlers::entry::breadcrumbs))
        .route("/entries/{id}/tree", get(handlers::entry::subtree))
        .route("/entries/{id}/name", put(handlers::entry::rename_entry))
        .route("/entries/{id}/move", put(handlers::entry::move_entry))
        .route("/entries/{id}/star", put(handlers::entry::set_starred))
        .route("/entries/{id}/tags", post(handlers::entry::add_tag))
        .route("/entries/{id}/tags/{tag}", delete(handlers::entry::remove_tag))
}

/// Favorites view
fn favorites_routes() -> Router<AppState> {
    Router::new().route("/favorites", get(handlers::favorites::favorites))
}

/// Health endpoint
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use citrus_core::config::AppConfig;
use citrus_service::EntryService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Entry operations for every owner
    pub entry_service: Arc<EntryService>,
    /// When the server started
    pub started_at: Instant,
}

impl AppState {
    /// Creates the state from its parts.
    pub fn new(config: Arc<AppConfig>, entry_service: Arc<EntryService>) -> Self {
        Self {
            config,
            entry_service,
            started_at: Instant::now(),
        }
    }
}

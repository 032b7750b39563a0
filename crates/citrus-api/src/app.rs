//! Application builder: wires configuration, backends and the router.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tracing::{error, info};

use citrus_core::config::{AppConfig, StoreBackend};
use citrus_core::error::AppError;
use citrus_database::repositories::entry::EntryRepository;
use citrus_database::{DatabasePool, MemoryEntryRepository, PgEntryRepository};
use citrus_service::EntryService;
use citrus_storage::build_blob_store;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Connects the configured entry store and blob store and assembles the state.
pub async fn build_state(config: AppConfig) -> Result<AppState, AppError> {
    // ── Entry store ──────────────────────────────────────────────
    let repo: Arc<dyn EntryRepository> = match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory entry store");
            Arc::new(MemoryEntryRepository::new())
        }
        StoreBackend::Postgres => {
            let db = DatabasePool::connect(&config.database).await?;
            if config.store.auto_migrate {
                citrus_database::migration::run_migrations(db.pool()).await?;
            }
            Arc::new(PgEntryRepository::new(db.into_pool()))
        }
    };

    // ── Blob store ───────────────────────────────────────────────
    let blobs = build_blob_store(&config.storage).await?;

    // ── Services ─────────────────────────────────────────────────
    let entry_service = Arc::new(EntryService::new(
        repo,
        blobs,
        config.storage.max_upload_size_bytes,
    ));

    Ok(AppState::new(Arc::new(config), entry_service))
}

/// Runs the CitrusNotes server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting CitrusNotes server...");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| AppError::configuration(format!("Invalid bind address: {e}")))?;

    let state = build_state(config).await?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!(%addr, "CitrusNotes server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    info!("CitrusNotes server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

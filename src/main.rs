//! CitrusNotes Server: folders, tags and favorites for notes and files.
//!
//! Main entry point that loads configuration, sets up logging and starts
//! the HTTP server.

use tracing_subscriber::{EnvFilter, fmt};

use citrus_core::config::AppConfig;
use citrus_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from `config/default.toml`, the environment overlay
/// and `CITRUS__*` variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    match std::env::var("CITRUS_CONFIG") {
        Ok(path) => AppConfig::from_file(&path),
        Err(_) => {
            let env = std::env::var("CITRUS_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        store = ?config.store.backend,
        blobs = ?config.storage.provider,
        "Starting CitrusNotes"
    );
    citrus_api::run_server(config).await
}

//! Entry store migration command.

use citrus_core::config::StoreBackend;
use citrus_core::error::AppError;
use citrus_database::DatabasePool;
use citrus_database::connection::mask_password;

use crate::output;

/// Apply pending migrations to the configured Postgres database.
pub async fn execute(config_path: &str) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    if config.store.backend != StoreBackend::Postgres {
        output::print_warning("store.backend is not postgres; migrating the configured database anyway");
    }

    println!("Connecting to {}...", mask_password(&config.database.url));
    let db = DatabasePool::connect(&config.database).await?;
    citrus_database::migration::run_migrations(db.pool()).await?;
    db.close().await;

    output::print_success("All migrations applied successfully.");
    Ok(())
}

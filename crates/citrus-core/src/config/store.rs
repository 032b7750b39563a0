//! Entry store backend configuration.

use serde::{Deserialize, Serialize};

/// Which persistence backend holds the entry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local arena; state is lost on restart.
    #[default]
    Memory,
    /// PostgreSQL via sqlx.
    Postgres,
}

/// Entry store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Selected backend.
    #[serde(default)]
    pub backend: StoreBackend,
    /// Run embedded migrations on startup (postgres only).
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            auto_migrate: default_auto_migrate(),
        }
    }
}

fn default_auto_migrate() -> bool {
    true
}

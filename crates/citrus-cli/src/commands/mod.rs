//! CLI command definitions and dispatch.

pub mod config;
pub mod favorites;
pub mod migrate;
pub mod serve;
pub mod tree;

use clap::{Parser, Subcommand};

use citrus_core::config::AppConfig;
use citrus_core::error::AppError;
use citrus_core::types::OwnerId;

use crate::output::OutputFormat;

/// CitrusNotes: notes and files organized in folders, tags and favorites
#[derive(Debug, Parser)]
#[command(name = "citrus", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the CitrusNotes server
    Serve(serve::ServeArgs),
    /// Apply entry store migrations
    Migrate,
    /// Print an owner's entry tree
    Tree(tree::TreeArgs),
    /// Print an owner's favorites view
    Favorites(favorites::FavoritesArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.config).await,
            Commands::Migrate => migrate::execute(&self.config).await,
            Commands::Tree(args) => tree::execute(args, &self.config, self.format).await,
            Commands::Favorites(args) => {
                favorites::execute(args, &self.config, self.format).await
            }
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::from_file(config_path)
}

/// Helper: parse an owner id argument
pub fn parse_owner(raw: &str) -> Result<OwnerId, AppError> {
    raw.parse()
        .map_err(|_| AppError::validation(format!("Invalid owner id: {raw}")))
}

//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use citrus_core::error::AppError;
use citrus_database::connection::mask_password;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut config = super::load_config(config_path)?;
            config.database.url = mask_password(&config.database.url);

            match format {
                OutputFormat::Json => output::print_json(&config),
                OutputFormat::Table => {
                    println!("Configuration '{config_path}':");
                    output::print_kv(
                        "server",
                        &format!("{}:{}", config.server.host, config.server.port),
                    );
                    output::print_kv(
                        "request timeout",
                        &format!("{}s", config.server.request_timeout_seconds),
                    );
                    output::print_kv("store backend", &format!("{:?}", config.store.backend));
                    output::print_kv("auto migrate", &config.store.auto_migrate.to_string());
                    output::print_kv("database", &config.database.url);
                    output::print_kv("blob provider", &format!("{:?}", config.storage.provider));
                    output::print_kv("blob root", &config.storage.root_path);
                    output::print_kv(
                        "max upload",
                        &format!("{} bytes", config.storage.max_upload_size_bytes),
                    );
                    output::print_kv(
                        "logging",
                        &format!("{} ({})", config.logging.level, config.logging.format),
                    );
                }
            }
        }
    }

    Ok(())
}

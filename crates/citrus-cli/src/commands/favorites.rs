//! Print an owner's favorites view.

use clap::Args;

use citrus_core::error::AppError;
use citrus_service::RequestContext;

use super::tree::TreeRow;
use crate::output::{self, OutputFormat};

/// Arguments for the favorites command
#[derive(Debug, Args)]
pub struct FavoritesArgs {
    /// Owner whose favorites to print
    #[arg(short, long)]
    pub owner: String,
}

/// Execute the favorites command
pub async fn execute(
    args: &FavoritesArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let ctx = RequestContext::new(super::parse_owner(&args.owner)?);

    let state = citrus_api::build_state(config).await?;
    let forest = state.entry_service.favorites(&ctx).await?;

    match format {
        OutputFormat::Json => output::print_json(&forest),
        OutputFormat::Table => output::print_list(&TreeRow::from_forest(&forest), format),
    }
    Ok(())
}

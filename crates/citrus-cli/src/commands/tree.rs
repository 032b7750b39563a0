//! Print an owner's entry tree.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use citrus_core::config::StoreBackend;
use citrus_core::error::AppError;
use citrus_core::types::EntryId;
use citrus_entity::entry::{EntryNode, TagSet};
use citrus_service::RequestContext;

use crate::output::{self, OutputFormat};

/// Arguments for the tree command
#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Owner whose tree to print
    #[arg(short, long)]
    pub owner: String,

    /// Start from this folder instead of the root level
    #[arg(short, long)]
    pub parent: Option<String>,
}

/// One line of a printed tree
#[derive(Debug, Serialize, Tabled)]
pub struct TreeRow {
    /// Name, indented by depth
    name: String,
    /// folder or file
    kind: &'static str,
    /// Star marker
    starred: &'static str,
    /// Comma-separated tags
    tags: String,
    /// Entry ID
    id: String,
}

impl TreeRow {
    pub(crate) fn from_forest(forest: &[EntryNode]) -> Vec<Self> {
        forest
            .iter()
            .flat_map(|root| root.flatten())
            .map(|(depth, entry)| TreeRow {
                name: format!(
                    "{}{}{}",
                    "  ".repeat(depth),
                    entry.name,
                    if entry.is_folder { "/" } else { "" }
                ),
                kind: if entry.is_folder { "folder" } else { "file" },
                starred: if entry.is_starred { "★" } else { "" },
                tags: entry.tags.to_vec().join(","),
                id: entry.id.to_string(),
            })
            .collect()
    }
}

/// Execute the tree command
pub async fn execute(
    args: &TreeArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    if config.store.backend == StoreBackend::Memory {
        output::print_warning("store.backend is memory; the tree is always empty");
    }
    let ctx = RequestContext::new(super::parse_owner(&args.owner)?);
    let parent = args
        .parent
        .as_deref()
        .map(|p| {
            p.parse::<EntryId>()
                .map_err(|_| AppError::validation(format!("Invalid parent id: {p}")))
        })
        .transpose()?;

    let state = citrus_api::build_state(config).await?;
    let service = &state.entry_service;

    let forest = match parent {
        Some(id) => vec![service.subtree(&ctx, id).await?],
        None => {
            let roots = service.list_children(&ctx, None, &TagSet::default()).await?;
            let mut forest = Vec::with_capacity(roots.len());
            for root in roots {
                forest.push(service.subtree(&ctx, root.id).await?);
            }
            forest
        }
    };

    match format {
        OutputFormat::Json => output::print_json(&forest),
        OutputFormat::Table => output::print_list(&TreeRow::from_forest(&forest), format),
    }
    Ok(())
}

//! Rename and delete commands, for folders and files alike.

use clap::Args;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use stowage_core::config::AppConfig;
use stowage_core::result::AppResult;
use stowage_core::types::OwnerId;
use stowage_service::{EntryKind, OwnerContext};

/// Arguments for `rename`
#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Owner ID
    pub owner: OwnerId,
    /// Entry kind: `folder` or `file`
    pub kind: EntryKind,
    /// Entry ID
    pub id: Uuid,
    /// New name
    pub name: String,
}

/// Arguments for `rm`
#[derive(Debug, Args)]
pub struct RmArgs {
    /// Owner ID
    pub owner: OwnerId,
    /// Entry kind: `folder` or `file`
    pub kind: EntryKind,
    /// Entry ID
    pub id: Uuid,
}

/// Rename a folder or a file
pub async fn rename(args: &RenameArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let stowage = super::connect(config).await?;
    let entry = stowage
        .rename_entry(&OwnerContext::new(args.owner), args.id, args.kind, &args.name)
        .await?;

    match format {
        OutputFormat::Json => output::print_json(&entry),
        OutputFormat::Table => {
            output::print_success(&format!("Renamed {} {} to '{}'", args.kind, args.id, entry.name()))
        }
    }
    Ok(())
}

/// Delete a file, or a folder with its whole subtree
pub async fn remove(args: &RmArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let stowage = super::connect(config).await?;
    let summary = stowage
        .delete_entry(&OwnerContext::new(args.owner), args.id, args.kind)
        .await?;

    match format {
        OutputFormat::Json => output::print_json(&summary),
        OutputFormat::Table => {
            output::print_success(&format!("Deleted {} {}", args.kind, args.id));
            output::print_kv("folders removed", &summary.folders_removed.to_string());
            output::print_kv("files removed", &summary.files_removed.to_string());
            if summary.blobs_removed < summary.blobs_attempted {
                output::print_warning(&format!(
                    "{} of {} blobs could not be removed and are now orphaned",
                    summary.blobs_attempted - summary.blobs_removed,
                    summary.blobs_attempted
                ));
            }
        }
    }
    Ok(())
}

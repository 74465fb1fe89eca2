//! Folder commands: provisioning, tree, listing, and creation.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use stowage_core::config::AppConfig;
use stowage_core::result::AppResult;
use stowage_core::types::{FolderId, OwnerId};
use stowage_entity::{File, Folder};
use stowage_service::OwnerContext;

/// Arguments for `provision`
#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// Owner ID
    pub owner: OwnerId,
}

/// Arguments for `tree`
#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Owner ID
    pub owner: OwnerId,
}

/// Arguments for `ls`
#[derive(Debug, Args)]
pub struct LsArgs {
    /// Owner ID
    pub owner: OwnerId,
    /// Folder ID (defaults to the root folder)
    pub folder: Option<FolderId>,
}

/// Arguments for `mkdir`
#[derive(Debug, Args)]
pub struct MkdirArgs {
    /// Owner ID
    pub owner: OwnerId,
    /// Parent folder ID
    pub parent: FolderId,
    /// New folder name
    pub name: String,
}

/// One listing row, folder or file
#[derive(Debug, Serialize, Tabled)]
struct EntryRow {
    /// Entry kind
    kind: &'static str,
    /// Entry ID
    id: String,
    /// Name
    name: String,
    /// Size in bytes, files only
    size: String,
    /// Last update
    updated_at: String,
}

impl From<&Folder> for EntryRow {
    fn from(folder: &Folder) -> Self {
        Self {
            kind: "folder",
            id: folder.id.to_string(),
            name: format!("{}/", folder.name),
            size: "-".to_string(),
            updated_at: folder.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

impl From<&File> for EntryRow {
    fn from(file: &File) -> Self {
        Self {
            kind: "file",
            id: file.id.to_string(),
            name: file.name.clone(),
            size: file.size_bytes.to_string(),
            updated_at: file.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Create the owner's root folder and blob directory
pub async fn provision(args: &ProvisionArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let stowage = super::connect(config).await?;
    let root = stowage.provision_owner(&OwnerContext::new(args.owner)).await?;

    match format {
        OutputFormat::Json => output::print_json(&root),
        OutputFormat::Table => output::print_success(&format!(
            "Owner {} provisioned (root folder: {})",
            args.owner, root.id
        )),
    }
    Ok(())
}

/// Print the owner's full folder tree
pub async fn tree(args: &TreeArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let stowage = super::connect(config).await?;
    let tree = stowage
        .build_folder_tree(&OwnerContext::new(args.owner))
        .await?;

    output::print_tree(&tree, format);
    Ok(())
}

/// List a folder's direct contents, preceded by its path
pub async fn ls(args: &LsArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let stowage = super::connect(config).await?;
    let ctx = OwnerContext::new(args.owner);

    let view = match args.folder {
        Some(folder_id) => stowage.resolve_folder(&ctx, folder_id).await?,
        None => stowage.resolve_root(&ctx).await?,
    };

    if format == OutputFormat::Json {
        output::print_json(&view);
        return Ok(());
    }

    let path = stowage.resolve_ancestor_path(&ctx, view.folder.id).await?;
    let breadcrumb: Vec<&str> = path.iter().map(|s| s.name.as_str()).collect();
    println!("/{}", breadcrumb.join("/"));

    let rows: Vec<EntryRow> = view
        .subfolders
        .iter()
        .map(EntryRow::from)
        .chain(view.files.iter().map(EntryRow::from))
        .collect();
    output::print_list(&rows, format);
    Ok(())
}

/// Create a subfolder under an existing folder
pub async fn mkdir(args: &MkdirArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let stowage = super::connect(config).await?;
    let folder = stowage
        .create_subfolder(&OwnerContext::new(args.owner), args.parent, &args.name)
        .await?;

    match format {
        OutputFormat::Json => output::print_json(&folder),
        OutputFormat::Table => {
            output::print_success(&format!("Folder '{}' created (id: {})", folder.name, folder.id))
        }
    }
    Ok(())
}

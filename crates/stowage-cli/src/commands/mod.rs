//! CLI command definitions and dispatch.

pub mod entry;
pub mod folder;
pub mod health;
pub mod migrate;
pub mod transfer;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::output::OutputFormat;
use stowage_core::config::AppConfig;
use stowage_core::result::AppResult;
use stowage_database::{DatabasePool, FileRepository, FolderRepository};
use stowage_service::Stowage;
use stowage_storage::LocalBlobStore;

/// Stowage: per-owner folder hierarchies over PostgreSQL and a blob directory
#[derive(Debug, Parser)]
#[command(name = "stowage", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and per-environment overlays
    #[arg(long, default_value = "config")]
    pub config_dir: String,

    /// Environment overlay to apply on top of default.toml
    #[arg(long, default_value = "development")]
    pub env: String,

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
    /// Apply pending metadata schema migrations
    Migrate,
    /// Create an owner's root folder and blob directory
    Provision(folder::ProvisionArgs),
    /// Print an owner's folder tree
    Tree(folder::TreeArgs),
    /// List a folder's subfolders and files
    Ls(folder::LsArgs),
    /// Create a subfolder
    Mkdir(folder::MkdirArgs),
    /// Rename a folder or file
    Rename(entry::RenameArgs),
    /// Delete a file, or a folder with everything beneath it
    Rm(entry::RmArgs),
    /// Upload local files into a folder
    Upload(transfer::UploadArgs),
    /// Write a file's bytes to stdout or a local path
    Cat(transfer::CatArgs),
    /// Check metadata and blob store reachability
    Health,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.command {
            Commands::Migrate => migrate::execute(config).await,
            Commands::Provision(args) => folder::provision(args, config, self.format).await,
            Commands::Tree(args) => folder::tree(args, config, self.format).await,
            Commands::Ls(args) => folder::ls(args, config, self.format).await,
            Commands::Mkdir(args) => folder::mkdir(args, config, self.format).await,
            Commands::Rename(args) => entry::rename(args, config, self.format).await,
            Commands::Rm(args) => entry::remove(args, config, self.format).await,
            Commands::Upload(args) => transfer::upload(args, config, self.format).await,
            Commands::Cat(args) => transfer::cat(args, config).await,
            Commands::Health => health::execute(config, self.format).await,
        }
    }
}

/// Helper: create the database pool from config
pub async fn create_db_pool(config: &AppConfig) -> AppResult<DatabasePool> {
    DatabasePool::connect(&config.database).await
}

/// Helper: wire the PostgreSQL stores and the local blob store into the facade
pub async fn connect(config: &AppConfig) -> AppResult<Stowage> {
    let pool = create_db_pool(config).await?.into_pool();
    let blobs = LocalBlobStore::new(&config.storage.root_path).await?;
    debug!(root = %config.storage.root_path, "Blob store ready");

    Ok(Stowage::new(
        Arc::new(FolderRepository::new(pool.clone())),
        Arc::new(FileRepository::new(pool)),
        Arc::new(blobs),
        config.storage.clone(),
    ))
}

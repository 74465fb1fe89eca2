//! Upload and download commands.

use std::path::{Path, PathBuf};

use clap::Args;
use futures::StreamExt;
use serde::Serialize;
use tabled::Tabled;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use tracing::warn;

use crate::output::{self, OutputFormat};
use stowage_core::config::AppConfig;
use stowage_core::error::{AppError, ErrorKind};
use stowage_core::result::AppResult;
use stowage_core::traits::storage::ByteStream;
use stowage_core::types::{FileId, FolderId, OwnerId};
use stowage_service::{IncomingFile, OwnerContext, Stowage, UploadOutcome};

/// Arguments for `upload`
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Owner ID
    pub owner: OwnerId,
    /// Target folder ID
    pub folder: FolderId,
    /// Local files to upload
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

/// Arguments for `cat`
#[derive(Debug, Args)]
pub struct CatArgs {
    /// Owner ID
    pub owner: OwnerId,
    /// File ID
    pub file: FileId,
    /// Write to this path instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Upload result row
#[derive(Debug, Serialize, Tabled)]
struct UploadRow {
    /// File name
    name: String,
    /// Committed or failed
    status: &'static str,
    /// File ID or failure reason
    detail: String,
}

impl From<&UploadOutcome> for UploadRow {
    fn from(outcome: &UploadOutcome) -> Self {
        match outcome {
            UploadOutcome::Committed(file) => Self {
                name: file.name.clone(),
                status: "committed",
                detail: file.id.to_string(),
            },
            UploadOutcome::Failed { name, message, .. } => Self {
                name: name.clone(),
                status: "failed",
                detail: message.clone(),
            },
        }
    }
}

/// Stage every local file, then commit them as one batch
pub async fn upload(args: &UploadArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let stowage = super::connect(config).await?;
    let ctx = OwnerContext::new(args.owner);

    let incoming = stage_all(&stowage, &ctx, &args.paths).await?;
    let outcomes = stowage.commit_upload(&ctx, args.folder, incoming).await?;
    let rows: Vec<UploadRow> = outcomes.iter().map(UploadRow::from).collect();
    output::print_list(&rows, format);

    let failed = outcomes.iter().filter(|o| !o.is_committed()).count();
    if failed > 0 {
        output::print_warning(&format!("{failed} of {} files failed", outcomes.len()));
    }
    Ok(())
}

/// Stage each path in order. If any path fails, the files staged before it
/// are discarded and the error is returned.
async fn stage_all(
    stowage: &Stowage,
    ctx: &OwnerContext,
    paths: &[PathBuf],
) -> AppResult<Vec<IncomingFile>> {
    let mut incoming = Vec::with_capacity(paths.len());
    for path in paths {
        match stage_one(stowage, ctx, path).await {
            Ok(file) => incoming.push(file),
            Err(e) => {
                warn!(path = %path.display(), staged = incoming.len(), "Staging failed; discarding batch");
                stowage.discard_staged(ctx, &incoming).await;
                return Err(e);
            }
        }
    }
    Ok(incoming)
}

async fn stage_one(stowage: &Stowage, ctx: &OwnerContext, path: &Path) -> AppResult<IncomingFile> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::validation(format!("Not a file name: {}", path.display())))?;

    let file = tokio::fs::File::open(path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Io,
            format!("Failed to open {}: {e}", path.display()),
            e,
        )
    })?;
    let stream: ByteStream = Box::pin(ReaderStream::new(file));

    stowage.stage_upload(ctx, name, None, stream).await
}

/// Stream a file's bytes to stdout or a local path
pub async fn cat(args: &CatArgs, config: &AppConfig) -> AppResult<()> {
    let stowage = super::connect(config).await?;
    let mut download = stowage
        .stream_file_bytes(&OwnerContext::new(args.owner), args.file)
        .await?;

    let mut writer: Box<dyn AsyncWrite + Unpin + Send> = match &args.output {
        Some(path) => Box::new(tokio::fs::File::create(path).await?),
        None => Box::new(tokio::io::stdout()),
    };

    let mut written = 0u64;
    while let Some(chunk) = download.stream.next().await {
        let chunk = chunk?;
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    writer.flush().await?;

    if let Some(path) = &args.output {
        output::print_success(&format!(
            "Wrote {} ({written} bytes, {}) to {}",
            download.filename(),
            download.content_type(),
            path.display()
        ));
    }
    Ok(())
}

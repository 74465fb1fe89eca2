//! Store reachability check.

use crate::output::{self, OutputFormat};
use stowage_core::config::AppConfig;
use stowage_core::error::AppError;
use stowage_core::result::AppResult;

/// Report whether both stores answer
pub async fn execute(config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let stowage = super::connect(config).await?;
    let report = stowage.health_check().await;

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => {
            let status = |ok: bool| if ok { "ok" } else { "unreachable" };
            output::print_kv("metadata", status(report.metadata));
            output::print_kv("blobs", status(report.blobs));
        }
    }

    if report.is_healthy() {
        Ok(())
    } else {
        Err(AppError::store("One or more stores are unreachable"))
    }
}

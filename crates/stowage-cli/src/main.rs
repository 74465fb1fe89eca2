//! Stowage CLI entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod output;

use commands::Cli;
use output::OutputFormat;
use stowage_core::config::{AppConfig, LoggingConfig};
use stowage_service::Outcome;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config_dir, &cli.env) {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&format!("Configuration error: {e}"));
            std::process::exit(2);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = cli.execute(&config).await {
        match cli.format {
            OutputFormat::Json => output::print_json(&Outcome::from_error(&e)),
            OutputFormat::Table => output::print_error(&e.to_string()),
        }
        std::process::exit(1);
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

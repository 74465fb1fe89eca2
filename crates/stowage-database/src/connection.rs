//! PostgreSQL connection pool for the metadata store.

use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{debug, info};

use stowage_core::config::DatabaseConfig;
use stowage_core::error::{AppError, ErrorKind};
use stowage_core::result::AppResult;

/// Application name reported to `pg_stat_activity`.
const APPLICATION_NAME: &str = "stowage";

/// Metadata store connection pool.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open a pool as described by `config`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let options = connect_options(&config.url)?;
        let target = describe_target(&options);
        info!(
            target_db = %target,
            max_connections = config.max_connections,
            "Connecting to metadata store"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(config.idle_timeout())
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Store, format!("Cannot reach {target}: {e}"), e)
            })?;

        debug!(target_db = %target, "Metadata store pool ready");
        Ok(Self { pool })
    }

    /// Borrow the sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Take the sqlx pool, e.g. to hand clones to the repositories.
    pub fn into_pool(self) -> PgPool {
        self.pool
    }

    /// Run a trivial query on a pooled connection.
    pub async fn health_check(&self) -> AppResult<bool> {
        let one: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Store, "Metadata store health check failed", e))?;
        Ok(one == 1)
    }

    /// Wait for checked-out connections and close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Metadata store pool closed");
    }
}

fn connect_options(url: &str) -> AppResult<PgConnectOptions> {
    PgConnectOptions::from_str(url)
        .map(|options| options.application_name(APPLICATION_NAME))
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                "database.url is not a valid PostgreSQL URL",
                e,
            )
        })
}

/// `user@host:port/database`, never including the password.
fn describe_target(options: &PgConnectOptions) -> String {
    format!(
        "{}@{}:{}/{}",
        options.get_username(),
        options.get_host(),
        options.get_port(),
        options.get_database().unwrap_or("-")
    )
}

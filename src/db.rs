use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::config::AppConfig;

/// Connects to Postgres, retrying every `db_connect_retry` until it succeeds.
pub async fn connect(config: &AppConfig) -> PgPool {
    let mut attempt = 1u32;
    loop {
        match PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.database_url)
            .await
        {
            Ok(pool) => {
                info!(attempt, "connected to database");
                return pool;
            }
            Err(e) => {
                warn!(
                    error = %e,
                    attempt,
                    retry_in = ?config.db_connect_retry,
                    "database connection failed; retrying"
                );
                tokio::time::sleep(config.db_connect_retry).await;
                attempt = attempt.saturating_add(1);
            }
        }
    }
}

pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    Ok(())
}

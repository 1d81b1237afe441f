//! Metadata store pool and schema

use anyhow::{Context, Result};
use clipvault_core::Config;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Schema migrations, compiled into the binary.
static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

fn pool_options(config: &Config) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
}

/// Connect to Postgres and bring the `videos` schema up to date.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let pool = pool_options(config)
        .connect(config.database_url())
        .await
        .context("Failed to connect to the metadata store")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        acquire_timeout_secs = config.db_timeout_seconds(),
        "Metadata store connected"
    );

    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to apply schema migrations")?;
    tracing::info!(migrations = MIGRATOR.iter().count(), "Schema up to date");

    Ok(pool)
}

//! Application setup and initialization
//!
//! Wiring shared by the binary and the integration tests.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

pub use server::start_server;

use crate::state::AppState;
use anyhow::{Context, Result};
use clipvault_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    clipvault_infra::init_telemetry(
        config.service_name(),
        config.environment(),
        config.log_json(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        service = %config.service_name(),
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;

    let storage = storage::setup_storage(&config).await?;

    let state = services::initialize_services(&config, pool, storage)?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}

//! Service and repository wiring

use anyhow::{Context, Result};
use clipvault_core::Config;
use clipvault_db::PgVideoRepository;
use clipvault_services::{
    HttpTranscodingTrigger, LoggingTranscodingTrigger, Storage, TranscodeDispatcher,
    TranscodeDispatcherConfig, TranscodingTrigger, VideoService,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use crate::state::AppState;

/// Pick the transcoding trigger: HTTP when an endpoint is configured, log-only otherwise.
pub fn build_transcoding_trigger(config: &Config) -> Result<Arc<dyn TranscodingTrigger>> {
    match config.transcoder_url() {
        Some(url) => {
            let trigger = HttpTranscodingTrigger::new(
                url,
                Duration::from_secs(config.transcoder_timeout_seconds()),
            )
            .context("Failed to create transcoding trigger")?;
            tracing::info!(transcoder.endpoint = %url, "HTTP transcoding trigger enabled");
            Ok(Arc::new(trigger))
        }
        None => {
            tracing::warn!("TRANSCODER_URL not set, transcode requests will only be logged");
            Ok(Arc::new(LoggingTranscodingTrigger))
        }
    }
}

pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let trigger = build_transcoding_trigger(config)?;
    let transcoder = TranscodeDispatcher::spawn(
        trigger,
        TranscodeDispatcherConfig {
            max_concurrent: config.transcode_max_concurrent(),
        },
    );

    let repository = Arc::new(PgVideoRepository::new(pool));
    let video_service = VideoService::new(repository, storage, transcoder.clone());

    tracing::info!(
        max_concurrent_transcodes = config.transcode_max_concurrent(),
        "Services initialized"
    );

    Ok(Arc::new(AppState {
        video_service,
        transcoder,
        config: config.clone(),
    }))
}

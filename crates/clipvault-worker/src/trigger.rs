use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// Starts downstream transcoding of a stored video.
#[async_trait]
pub trait TranscodingTrigger: Send + Sync {
    /// `location` is the public URL of the original video object.
    async fn start(&self, video_id: Uuid, location: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct TranscodeRequest<'a> {
    video_id: Uuid,
    source_url: &'a str,
    /// Where the transcoder reports the outcome.
    callback_status_path: String,
}

/// Notifies an external transcoder over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTranscodingTrigger {
    http_client: Client,
    endpoint: String,
}

impl HttpTranscodingTrigger {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for transcoder")?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl TranscodingTrigger for HttpTranscodingTrigger {
    #[tracing::instrument(skip(self), fields(video.id = %video_id, transcoder.endpoint = %self.endpoint))]
    async fn start(&self, video_id: Uuid, location: &str) -> Result<()> {
        let request = TranscodeRequest {
            video_id,
            source_url: location,
            callback_status_path: format!("/api/v1/videos/{}/encoding-status", video_id),
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context("Failed to reach transcoder")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Transcoder rejected job: {} - {}",
                status,
                error_text
            ));
        }

        tracing::debug!(status = %status, "Transcoder accepted job");
        Ok(())
    }
}

/// Used when no transcoder endpoint is configured: records the request in the log only.
#[derive(Debug, Clone, Default)]
pub struct LoggingTranscodingTrigger;

#[async_trait]
impl TranscodingTrigger for LoggingTranscodingTrigger {
    async fn start(&self, video_id: Uuid, location: &str) -> Result<()> {
        tracing::info!(
            video.id = %video_id,
            source_url = %location,
            "No transcoder configured, skipping transcode"
        );
        Ok(())
    }
}

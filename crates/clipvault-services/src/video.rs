//! Video lifecycle orchestration.
//!
//! Steps of a workflow are either must-succeed (the binary write and every metadata
//! read or write) or best-effort (thumbnail write, binary deletes, transcode dispatch).
//! Must-succeed failures abort the operation with an internal error; best-effort
//! failures are logged at `warn` and swallowed. Binary objects left behind by an
//! aborted upload or a failed delete are not reconciled here; their keys are logged.

use std::sync::Arc;

use bytes::Bytes;
use clipvault_core::models::{EncodingStatus, NewVideo, Video, VideoUpdate};
use clipvault_core::{AppError, ObjectKind};
use clipvault_db::VideoRepository;
use clipvault_storage::Storage;
use clipvault_worker::{TranscodeDispatcher, TranscodeJob};
use uuid::Uuid;
use validator::Validate;

/// Wrap a collaborator failure in a must-succeed step as an internal error.
fn internal<E>(step: &str, err: E) -> AppError
where
    E: std::error::Error + Send + Sync + 'static,
{
    tracing::error!(error = %err, step, "Video lifecycle step failed");
    AppError::InternalWithSource {
        message: format!("Failed to {}", step),
        source: anyhow::Error::new(err),
    }
}

#[derive(Clone)]
pub struct VideoService {
    repository: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    transcoder: TranscodeDispatcher,
}

impl VideoService {
    pub fn new(
        repository: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        transcoder: TranscodeDispatcher,
    ) -> Self {
        Self {
            repository,
            storage,
            transcoder,
        }
    }

    /// Store the payload, persist the record and hand the video to the transcoder.
    ///
    /// Returns once the record is persisted; transcoding starts in the background.
    #[tracing::instrument(skip(self, upload), fields(user.id = %upload.user_id, video.id = tracing::field::Empty, file_size = upload.video.len()))]
    pub async fn upload(&self, upload: NewVideo) -> Result<Video, AppError> {
        upload.validate()?;
        if upload.video.is_empty() {
            return Err(AppError::InvalidInput(
                "Video payload must not be empty".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        tracing::Span::current().record("video.id", tracing::field::display(id));
        let mut video = Video::new(id, &upload);

        let stored = self
            .storage
            .put(id, ObjectKind::OriginalVideo, upload.video.clone())
            .await
            .map_err(|e| internal("store video payload", e))?;
        video.video_url = stored.url;
        video.video_key = stored.key;

        if let Some(thumbnail) = upload.thumbnail.filter(|t| !t.is_empty()) {
            self.store_thumbnail(&mut video, thumbnail).await;
        }

        if let Err(e) = self.repository.create(&video).await {
            tracing::warn!(
                video.id = %id,
                orphaned_key = %video.video_key,
                orphaned_thumbnail_key = ?video.thumbnail_key,
                "Video record not persisted, stored objects are orphaned"
            );
            return Err(internal("create video record", e));
        }

        self.transcoder.dispatch(TranscodeJob {
            video_id: id,
            location: video.video_url.clone(),
        });

        tracing::info!(
            video.id = %id,
            user.id = %video.user_id,
            has_thumbnail = video.has_thumbnail(),
            "Video uploaded"
        );

        Ok(video)
    }

    async fn store_thumbnail(&self, video: &mut Video, thumbnail: Bytes) {
        match self
            .storage
            .put(video.id, ObjectKind::Thumbnail, thumbnail)
            .await
        {
            Ok(stored) => {
                video.thumbnail_url = stored.url;
                video.thumbnail_key = Some(stored.key);
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    video.id = %video.id,
                    "Failed to store thumbnail, continuing without one"
                );
            }
        }
    }

    #[tracing::instrument(skip(self), fields(video.id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Video, AppError> {
        self.repository
            .get_by_id(id)
            .await
            .map_err(|e| internal("fetch video", e))?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", id)))
    }

    /// Public videos of `owner`, newest first.
    #[tracing::instrument(skip(self), fields(user.id = %owner))]
    pub async fn list_by_owner(
        &self,
        owner: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Video>, AppError> {
        self.repository
            .list_by_owner(owner, limit, offset)
            .await
            .map_err(|e| internal("list videos", e))
    }

    /// Apply a partial update without checking ownership. Only for callers that have
    /// already authorized the change; the public surface goes through [`Self::update_owned`].
    #[tracing::instrument(skip(self, update), fields(video.id = %id))]
    pub async fn update(&self, id: Uuid, update: VideoUpdate) -> Result<Video, AppError> {
        update.validate()?;
        let video = self.get(id).await?;
        self.apply_update(video, &update).await
    }

    /// Apply a partial update on behalf of `requester`, who must own the video.
    #[tracing::instrument(skip(self, update), fields(video.id = %id, user.id = %requester))]
    pub async fn update_owned(
        &self,
        id: Uuid,
        requester: Uuid,
        update: VideoUpdate,
    ) -> Result<Video, AppError> {
        update.validate()?;
        let video = self.get(id).await?;
        if !video.is_owned_by(requester) {
            tracing::warn!(owner.id = %video.user_id, "Update rejected for non-owner");
            return Err(AppError::Forbidden(
                "Only the owner can modify this video".to_string(),
            ));
        }
        self.apply_update(video, &update).await
    }

    async fn apply_update(&self, mut video: Video, update: &VideoUpdate) -> Result<Video, AppError> {
        if update.is_empty() {
            return Ok(video);
        }
        update.apply(&mut video);
        self.repository
            .save(&video)
            .await
            .map_err(|e| internal("update video record", e))?;
        tracing::info!(video.id = %video.id, "Video updated");
        Ok(video)
    }

    /// Remove a video owned by `requester`. Binary objects are removed best-effort
    /// before the record, which is the source of truth.
    #[tracing::instrument(skip(self), fields(video.id = %id, user.id = %requester))]
    pub async fn delete(&self, id: Uuid, requester: Uuid) -> Result<(), AppError> {
        let video = self.get(id).await?;
        if !video.is_owned_by(requester) {
            tracing::warn!(owner.id = %video.user_id, "Delete rejected for non-owner");
            return Err(AppError::Forbidden(
                "Only the owner can delete this video".to_string(),
            ));
        }

        self.remove_object(id, &video.video_key).await;
        if let Some(ref key) = video.thumbnail_key {
            self.remove_object(id, key).await;
        }

        let deleted = self
            .repository
            .delete(id)
            .await
            .map_err(|e| internal("delete video record", e))?;
        if !deleted {
            return Err(AppError::NotFound(format!("Video {} not found", id)));
        }

        tracing::info!(video.id = %id, "Video deleted");
        Ok(())
    }

    async fn remove_object(&self, id: Uuid, key: &str) {
        if key.is_empty() {
            return;
        }
        if let Err(e) = self.storage.delete(key).await {
            tracing::warn!(
                error = %e,
                video.id = %id,
                orphaned_key = %key,
                "Failed to delete stored object, leaving it orphaned"
            );
        }
    }

    /// Public, completed videos by view count then recency.
    #[tracing::instrument(skip(self))]
    pub async fn get_trending(&self, limit: i64) -> Result<Vec<Video>, AppError> {
        self.repository
            .list_trending(limit)
            .await
            .map_err(|e| internal("list trending videos", e))
    }

    #[tracing::instrument(skip(self), fields(video.id = %id))]
    pub async fn record_view(&self, id: Uuid) -> Result<(), AppError> {
        let updated = self
            .repository
            .increment_view_count(id)
            .await
            .map_err(|e| internal("record view", e))?;
        if !updated {
            return Err(AppError::NotFound(format!("Video {} not found", id)));
        }
        Ok(())
    }

    /// Report the transcoding outcome. Only `processing` videos move; repeating the
    /// current terminal status succeeds, any other change of a terminal status conflicts.
    #[tracing::instrument(skip(self), fields(video.id = %id, encoding_status = %status))]
    pub async fn update_encoding_status(
        &self,
        id: Uuid,
        status: EncodingStatus,
    ) -> Result<(), AppError> {
        // Only processing videos move, so the target must be reachable from processing.
        if !EncodingStatus::Processing.can_transition_to(status) {
            return Err(AppError::InvalidInput(format!(
                "Encoding status can only be set to completed or failed, got {}",
                status
            )));
        }

        let moved = self
            .repository
            .update_status(id, status)
            .await
            .map_err(|e| internal("update encoding status", e))?;
        if moved {
            tracing::info!("Encoding status updated");
            return Ok(());
        }

        let current = self.get(id).await?;
        if current.encoding_status == status {
            tracing::debug!("Encoding status already set");
            return Ok(());
        }

        tracing::warn!(
            current_status = %current.encoding_status,
            "Rejected encoding status change out of a terminal state"
        );
        Err(AppError::Conflict(format!(
            "Video {} is already {}",
            id, current.encoding_status
        )))
    }
}

use async_trait::async_trait;
use clipvault_core::models::{EncodingStatus, Video};
use clipvault_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Persistence of video metadata records.
///
/// Counter and status writes are single statements so concurrent callers never
/// lose updates.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create(&self, video: &Video) -> Result<(), AppError>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Public videos of `user_id`, newest first.
    async fn list_by_owner(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Video>, AppError>;

    /// Persist the mutable fields of `video` and its `updated_at`.
    async fn save(&self, video: &Video) -> Result<(), AppError>;

    /// Returns `false` when no row matched.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Public, completed videos ordered by view count then recency.
    async fn list_trending(&self, limit: i64) -> Result<Vec<Video>, AppError>;

    /// Atomically add one view. Returns `false` when no row matched.
    async fn increment_view_count(&self, id: Uuid) -> Result<bool, AppError>;

    /// Move a video out of `processing`. Returns `false` when the video is absent or
    /// no longer processing.
    async fn update_status(&self, id: Uuid, status: EncodingStatus) -> Result<bool, AppError>;
}

const VIDEO_COLUMNS: &str = r#"
    id, user_id, title, description, video_url, video_key, thumbnail_url, thumbnail_key,
    duration_seconds, width, height, file_size, encoding_status,
    view_count, like_count, comment_count, share_count,
    is_public, allow_comments, allow_duet, allow_stitch,
    original_video_id, created_at, updated_at
"#;

/// PostgreSQL video repository
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "insert", db.record_id = %video.id))]
    async fn create(&self, video: &Video) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO videos (
                id, user_id, title, description, video_url, video_key, thumbnail_url, thumbnail_key,
                duration_seconds, width, height, file_size, encoding_status,
                view_count, like_count, comment_count, share_count,
                is_public, allow_comments, allow_duet, allow_stitch,
                original_video_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                    $18, $19, $20, $21, $22, $23, $24)
            "#,
        )
        .bind(video.id)
        .bind(video.user_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.video_url)
        .bind(&video.video_key)
        .bind(&video.thumbnail_url)
        .bind(&video.thumbnail_key)
        .bind(video.duration_seconds)
        .bind(video.width)
        .bind(video.height)
        .bind(video.file_size)
        .bind(video.encoding_status)
        .bind(video.view_count)
        .bind(video.like_count)
        .bind(video.comment_count)
        .bind(video.share_count)
        .bind(video.is_public)
        .bind(video.allow_comments)
        .bind(video.allow_duet)
        .bind(video.allow_stitch)
        .bind(video.original_video_id)
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(&format!(
            "SELECT {} FROM videos WHERE id = $1",
            VIDEO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", user.id = %user_id))]
    async fn list_by_owner(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Video>, AppError> {
        let videos = sqlx::query_as::<Postgres, Video>(&format!(
            "SELECT {} FROM videos WHERE user_id = $1 AND is_public ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            VIDEO_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "update", db.record_id = %video.id))]
    async fn save(&self, video: &Video) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE videos
            SET title = $2,
                description = $3,
                is_public = $4,
                allow_comments = $5,
                allow_duet = $6,
                allow_stitch = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(video.is_public)
        .bind(video.allow_comments)
        .bind(video.allow_duet)
        .bind(video.allow_stitch)
        .bind(video.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_trending(&self, limit: i64) -> Result<Vec<Video>, AppError> {
        let videos = sqlx::query_as::<Postgres, Video>(&format!(
            r#"
            SELECT {} FROM videos
            WHERE is_public AND encoding_status = 'completed'
            ORDER BY view_count DESC, created_at DESC
            LIMIT $1
            "#,
            VIDEO_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "update", db.record_id = %id))]
    async fn increment_view_count(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE videos SET view_count = view_count + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "update", db.record_id = %id, encoding_status = %status))]
    async fn update_status(&self, id: Uuid, status: EncodingStatus) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET encoding_status = $2, updated_at = NOW()
            WHERE id = $1 AND encoding_status = 'processing'
            "#,
        )
        .bind(id)
        .bind(status)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

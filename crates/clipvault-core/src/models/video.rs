use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Encoding state of an uploaded video.
///
/// Every video starts in `Processing` and moves exactly once to one of the
/// two terminal states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "encoding_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum EncodingStatus {
    Processing,
    Completed,
    Failed,
}

impl EncodingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EncodingStatus::Completed | EncodingStatus::Failed)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: EncodingStatus) -> bool {
        *self == EncodingStatus::Processing && next.is_terminal()
    }
}

impl Display for EncodingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            EncodingStatus::Processing => write!(f, "processing"),
            EncodingStatus::Completed => write!(f, "completed"),
            EncodingStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for EncodingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "processing" => Ok(EncodingStatus::Processing),
            "completed" => Ok(EncodingStatus::Completed),
            "failed" => Ok(EncodingStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid encoding status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub video_key: String,
    /// Empty when no thumbnail was stored.
    pub thumbnail_url: String,
    pub thumbnail_key: Option<String>,
    pub duration_seconds: i32,
    pub width: i32,
    pub height: i32,
    pub file_size: i64,
    pub encoding_status: EncodingStatus,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub share_count: i64,
    pub is_public: bool,
    pub allow_comments: bool,
    pub allow_duet: bool,
    pub allow_stitch: bool,
    pub original_video_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    /// Build a fresh record for an upload. Locators stay empty until the
    /// payload has been written to storage.
    pub fn new(id: Uuid, upload: &NewVideo) -> Self {
        let now = Utc::now();
        Video {
            id,
            user_id: upload.user_id,
            title: upload.title.clone(),
            description: upload.description.clone(),
            video_url: String::new(),
            video_key: String::new(),
            thumbnail_url: String::new(),
            thumbnail_key: None,
            duration_seconds: upload.duration_seconds,
            width: upload.width,
            height: upload.height,
            file_size: upload.video.len() as i64,
            encoding_status: EncodingStatus::Processing,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            share_count: 0,
            is_public: true,
            allow_comments: true,
            allow_duet: true,
            allow_stitch: true,
            original_video_id: upload.original_video_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.encoding_status == EncodingStatus::Processing
    }

    pub fn is_completed(&self) -> bool {
        self.encoding_status == EncodingStatus::Completed
    }

    pub fn is_failed(&self) -> bool {
        self.encoding_status == EncodingStatus::Failed
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    pub fn has_thumbnail(&self) -> bool {
        !self.thumbnail_url.is_empty()
    }

    // Unconditional; the status-update path rejects transitions out of a terminal state.
    pub fn mark_completed(&mut self) {
        self.encoding_status = EncodingStatus::Completed;
        self.updated_at = Utc::now();
    }

    pub fn mark_failed(&mut self) {
        self.encoding_status = EncodingStatus::Failed;
        self.updated_at = Utc::now();
    }

    pub fn increment_view_count(&mut self) {
        self.view_count += 1;
        self.updated_at = Utc::now();
    }
}

/// Input of the upload workflow.
#[derive(Clone, Validate)]
pub struct NewVideo {
    pub user_id: Uuid,
    #[validate(length(max = 255, message = "title must be at most 255 characters"))]
    pub title: String,
    pub description: String,
    pub video: Bytes,
    pub thumbnail: Option<Bytes>,
    #[validate(range(min = 0, message = "duration_seconds must not be negative"))]
    pub duration_seconds: i32,
    #[validate(range(min = 0, message = "width must not be negative"))]
    pub width: i32,
    #[validate(range(min = 0, message = "height must not be negative"))]
    pub height: i32,
    pub original_video_id: Option<Uuid>,
}

/// Partial update of the owner-mutable fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct VideoUpdate {
    #[validate(length(max = 255, message = "title must be at most 255 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub allow_comments: Option<bool>,
    pub allow_duet: Option<bool>,
    pub allow_stitch: Option<bool>,
}

impl VideoUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.is_public.is_none()
            && self.allow_comments.is_none()
            && self.allow_duet.is_none()
            && self.allow_stitch.is_none()
    }

    /// Apply the provided fields to `video`.
    pub fn apply(&self, video: &mut Video) {
        if self.is_empty() {
            return;
        }
        if let Some(ref title) = self.title {
            video.title = title.clone();
        }
        if let Some(ref description) = self.description {
            video.description = description.clone();
        }
        if let Some(is_public) = self.is_public {
            video.is_public = is_public;
        }
        if let Some(allow_comments) = self.allow_comments {
            video.allow_comments = allow_comments;
        }
        if let Some(allow_duet) = self.allow_duet {
            video.allow_duet = allow_duet;
        }
        if let Some(allow_stitch) = self.allow_stitch {
            video.allow_stitch = allow_stitch;
        }
        video.updated_at = Utc::now();
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    pub video_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: i32,
    pub width: i32,
    pub height: i32,
    pub file_size: i64,
    pub encoding_status: EncodingStatus,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub share_count: i64,
    pub is_public: bool,
    pub allow_comments: bool,
    pub allow_duet: bool,
    pub allow_stitch: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_video_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Video> for VideoResponse {
    fn from(video: Video) -> Self {
        VideoResponse {
            video_id: video.id,
            user_id: video.user_id,
            title: video.title,
            description: video.description,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            duration_seconds: video.duration_seconds,
            width: video.width,
            height: video.height,
            file_size: video.file_size,
            encoding_status: video.encoding_status,
            view_count: video.view_count,
            like_count: video.like_count,
            comment_count: video.comment_count,
            share_count: video.share_count,
            is_public: video.is_public,
            allow_comments: video.allow_comments,
            allow_duet: video.allow_duet,
            allow_stitch: video.allow_stitch,
            original_video_id: video.original_video_id,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_upload(video_len: usize) -> NewVideo {
        NewVideo {
            user_id: Uuid::new_v4(),
            title: "A".to_string(),
            description: "first clip".to_string(),
            video: Bytes::from(vec![0u8; video_len]),
            thumbnail: None,
            duration_seconds: 15,
            width: 1080,
            height: 1920,
            original_video_id: None,
        }
    }

    #[test]
    fn test_new_video_defaults() {
        let upload = test_upload(1000);
        let id = Uuid::new_v4();
        let video = Video::new(id, &upload);

        assert_eq!(video.id, id);
        assert_eq!(video.user_id, upload.user_id);
        assert_eq!(video.file_size, 1000);
        assert_eq!(video.encoding_status, EncodingStatus::Processing);
        assert!(video.is_public);
        assert!(video.allow_comments);
        assert!(video.allow_duet);
        assert!(video.allow_stitch);
        assert_eq!(video.view_count, 0);
        assert_eq!(video.thumbnail_url, "");
        assert!(!video.has_thumbnail());
        assert_eq!(video.created_at, video.updated_at);
    }

    #[test]
    fn test_status_predicates_and_transitions() {
        let mut video = Video::new(Uuid::new_v4(), &test_upload(10));
        assert!(video.is_processing());
        assert!(!video.is_completed());

        let before = video.updated_at;
        video.mark_completed();
        assert!(!video.is_processing());
        assert!(video.is_completed());
        assert!(video.updated_at >= before);

        let mut other = Video::new(Uuid::new_v4(), &test_upload(10));
        other.mark_failed();
        assert!(!other.is_processing());
        assert!(other.is_failed());
    }

    #[test]
    fn test_can_transition_to() {
        use EncodingStatus::*;
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));
        assert!(!Processing.can_transition_to(Processing));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Processing));
    }

    #[test]
    fn test_encoding_status_round_trips_as_lowercase() {
        assert_eq!(EncodingStatus::Completed.to_string(), "completed");
        assert_eq!(
            "FAILED".parse::<EncodingStatus>().unwrap(),
            EncodingStatus::Failed
        );
        assert!("encoding".parse::<EncodingStatus>().is_err());
        assert_eq!(
            serde_json::to_value(EncodingStatus::Processing).unwrap(),
            serde_json::json!("processing")
        );
    }

    #[test]
    fn test_increment_view_count() {
        let mut video = Video::new(Uuid::new_v4(), &test_upload(10));
        video.increment_view_count();
        video.increment_view_count();
        assert_eq!(video.view_count, 2);
    }

    #[test]
    fn test_update_applies_only_provided_fields() {
        let mut video = Video::new(Uuid::new_v4(), &test_upload(10));
        let update = VideoUpdate {
            title: Some("B".to_string()),
            is_public: Some(false),
            ..Default::default()
        };
        update.apply(&mut video);

        assert_eq!(video.title, "B");
        assert_eq!(video.description, "first clip");
        assert!(!video.is_public);
        assert!(video.allow_comments);
        assert!(video.allow_duet);
    }

    #[test]
    fn test_empty_update_is_noop() {
        let mut video = Video::new(Uuid::new_v4(), &test_upload(10));
        let snapshot = video.clone();
        let update = VideoUpdate::default();
        assert!(update.is_empty());
        update.apply(&mut video);
        assert_eq!(video, snapshot);
    }

    #[test]
    fn test_upload_validation() {
        let mut upload = test_upload(10);
        assert!(upload.validate().is_ok());

        upload.title = "x".repeat(256);
        assert!(upload.validate().is_err());

        let mut negative = test_upload(10);
        negative.duration_seconds = -1;
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_video_response_omits_storage_keys() {
        let mut video = Video::new(Uuid::new_v4(), &test_upload(10));
        video.video_key = "videos/x/original.mp4".to_string();
        video.video_url = "https://bucket.s3.us-east-1.amazonaws.com/videos/x/original.mp4".to_string();

        let response = VideoResponse::from(video.clone());
        assert_eq!(response.video_id, video.id);
        assert_eq!(response.video_url, video.video_url);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("video_key").is_none());
        assert!(json.get("thumbnail_key").is_none());
        assert!(json.get("original_video_id").is_none());
        assert_eq!(json["encoding_status"], "processing");
    }
}

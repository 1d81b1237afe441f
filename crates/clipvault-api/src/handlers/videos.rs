use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use clipvault_core::models::{EncodingStatus, NewVideo, VideoResponse, VideoUpdate};
use clipvault_core::AppError;
use clipvault_services::pagination::page_bounds;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::UserIdentity;
use crate::error::{ErrorResponse, HttpAppError, JsonBody};
use crate::handlers::parse_id;
use crate::state::AppState;

/// Multipart fields accepted by the upload endpoint (documentation only).
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadVideoForm {
    #[schema(value_type = String, format = Binary)]
    video: Vec<u8>,
    #[schema(value_type = Option<String>, format = Binary)]
    thumbnail: Option<Vec<u8>>,
    title: Option<String>,
    description: Option<String>,
    duration_seconds: Option<i32>,
    width: Option<i32>,
    height: Option<i32>,
    original_video_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct EncodingStatusUpdate {
    pub status: EncodingStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page size, 1 to 100 (default 20)
    pub limit: Option<i64>,
    /// Rows to skip (default 0)
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrendingQuery {
    /// Number of videos, 1 to 100 (default 20)
    pub limit: Option<i64>,
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> HttpAppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return HttpAppError(AppError::PayloadTooLarge(err.body_text()));
    }
    HttpAppError(AppError::BadRequest(format!(
        "Invalid multipart body: {}",
        err.body_text()
    )))
}

fn parse_number(field: &str, value: &str) -> Result<i32, HttpAppError> {
    value.trim().parse::<i32>().map_err(|_| {
        HttpAppError(AppError::InvalidInput(format!(
            "{} must be an integer",
            field
        )))
    })
}

/// Collect the upload form into a `NewVideo`. Unknown parts are ignored.
async fn read_upload_form(owner: Uuid, mut multipart: Multipart) -> Result<NewVideo, HttpAppError> {
    let mut video: Option<Bytes> = None;
    let mut thumbnail: Option<Bytes> = None;
    let mut title = String::new();
    let mut description = String::new();
    let mut duration_seconds = 0;
    let mut width = 0;
    let mut height = 0;
    let mut original_video_id = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video" => video = Some(field.bytes().await.map_err(multipart_error)?),
            "thumbnail" => {
                let data = field.bytes().await.map_err(multipart_error)?;
                if !data.is_empty() {
                    thumbnail = Some(data);
                }
            }
            "title" => title = field.text().await.map_err(multipart_error)?,
            "description" => description = field.text().await.map_err(multipart_error)?,
            "duration_seconds" => {
                duration_seconds =
                    parse_number(&name, &field.text().await.map_err(multipart_error)?)?
            }
            "width" => width = parse_number(&name, &field.text().await.map_err(multipart_error)?)?,
            "height" => {
                height = parse_number(&name, &field.text().await.map_err(multipart_error)?)?
            }
            "original_video_id" => {
                let raw = field.text().await.map_err(multipart_error)?;
                if !raw.trim().is_empty() {
                    original_video_id = Some(parse_id(raw.trim(), "original_video_id")?);
                }
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown multipart field");
            }
        }
    }

    let video = video.ok_or_else(|| {
        HttpAppError(AppError::InvalidInput(
            "Missing 'video' part in upload".to_string(),
        ))
    })?;

    Ok(NewVideo {
        user_id: owner,
        title,
        description,
        video,
        thumbnail,
        duration_seconds,
        width,
        height,
        original_video_id,
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/videos",
    tag = "videos",
    request_body(content = UploadVideoForm, content_type = "multipart/form-data"),
    params(("x-user-id" = Uuid, Header, description = "Caller identity")),
    responses(
        (status = 201, description = "Video stored, transcoding started", body = VideoResponse),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 401, description = "Missing identity", body = ErrorResponse),
        (status = 413, description = "Payload too large", body = ErrorResponse),
        (status = 500, description = "Storage or database failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(user.id = %user_id))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    UserIdentity(user_id): UserIdentity,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let upload = read_upload_form(user_id, multipart).await?;
    let video = state.video_service.upload(upload).await?;

    Ok((StatusCode::CREATED, Json(VideoResponse::from(video))))
}

#[utoipa::path(
    get,
    path = "/api/v1/videos/{id}",
    tag = "videos",
    params(("id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video metadata", body = VideoResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_id(&id, "video id")?;
    let video = state.video_service.get(id).await?;
    Ok(Json(VideoResponse::from(video)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/videos/{id}",
    tag = "videos",
    request_body = VideoUpdate,
    params(
        ("id" = Uuid, Path, description = "Video ID"),
        ("x-user-id" = Uuid, Header, description = "Caller identity")
    ),
    responses(
        (status = 200, description = "Updated video", body = VideoResponse),
        (status = 400, description = "Invalid update", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, update), fields(user.id = %user_id))]
pub async fn update_video(
    State(state): State<Arc<AppState>>,
    UserIdentity(user_id): UserIdentity,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<VideoUpdate>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_id(&id, "video id")?;
    let video = state.video_service.update_owned(id, user_id, update).await?;
    Ok(Json(VideoResponse::from(video)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/videos/{id}",
    tag = "videos",
    params(
        ("id" = Uuid, Path, description = "Video ID"),
        ("x-user-id" = Uuid, Header, description = "Caller identity")
    ),
    responses(
        (status = 204, description = "Video deleted"),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user.id = %user_id))]
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    UserIdentity(user_id): UserIdentity,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_id(&id, "video id")?;
    state.video_service.delete(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/videos/{id}/views",
    tag = "videos",
    params(("id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 204, description = "View recorded"),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state))]
pub async fn record_view(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_id(&id, "video id")?;
    state.video_service.record_view(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Transcoder callback reporting the outcome of an encode.
#[utoipa::path(
    put,
    path = "/api/v1/videos/{id}/encoding-status",
    tag = "videos",
    request_body = EncodingStatusUpdate,
    params(("id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 204, description = "Status recorded"),
        (status = 400, description = "Status is not terminal", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 409, description = "Video already has a different terminal status", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, body), fields(encoding_status = %body.status))]
pub async fn update_encoding_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<EncodingStatusUpdate>,
) -> Result<impl IntoResponse, HttpAppError> {
    let id = parse_id(&id, "video id")?;
    state
        .video_service
        .update_encoding_status(id, body.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/videos",
    tag = "videos",
    params(("user_id" = Uuid, Path, description = "Owner ID"), PageQuery),
    responses(
        (status = 200, description = "Public videos of the user, newest first", body = [VideoResponse]),
        (status = 400, description = "Malformed ID", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query))]
pub async fn list_user_videos(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let user_id = parse_id(&user_id, "user id")?;
    let (limit, offset) = page_bounds(query.limit, query.offset);
    let videos = state
        .video_service
        .list_by_owner(user_id, limit, offset)
        .await?;

    let response: Vec<VideoResponse> = videos.into_iter().map(VideoResponse::from).collect();
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/videos/trending",
    tag = "videos",
    params(TrendingQuery),
    responses(
        (status = 200, description = "Public, completed videos by views", body = [VideoResponse])
    )
)]
#[tracing::instrument(skip(state, query))]
pub async fn trending(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrendingQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (limit, _) = page_bounds(query.limit, None);
    let videos = state.video_service.get_trending(limit).await?;

    let response: Vec<VideoResponse> = videos.into_iter().map(VideoResponse::from).collect();
    Ok(Json(response))
}

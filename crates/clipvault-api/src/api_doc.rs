//! OpenAPI documentation, served at `/api/openapi.json` and rendered at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use clipvault_core::models;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Clipvault API",
        version = "0.1.0",
        description = "Video asset lifecycle: upload, metadata, views, trending and transcoding status."
    ),
    paths(
        handlers::health::liveness,
        handlers::videos::upload_video,
        handlers::videos::get_video,
        handlers::videos::update_video,
        handlers::videos::delete_video,
        handlers::videos::record_view,
        handlers::videos::update_encoding_status,
        handlers::videos::list_user_videos,
        handlers::videos::trending,
    ),
    components(schemas(
        models::VideoResponse,
        models::VideoUpdate,
        models::EncodingStatus,
        handlers::videos::UploadVideoForm,
        handlers::videos::EncodingStatusUpdate,
        handlers::health::LivenessResponse,
        error::ErrorResponse,
    )),
    tags(
        (name = "videos", description = "Video lifecycle"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_video_routes() {
        let spec = get_openapi_spec();
        for path in [
            "/health",
            "/api/v1/videos",
            "/api/v1/videos/{id}",
            "/api/v1/videos/{id}/views",
            "/api/v1/videos/{id}/encoding-status",
            "/api/v1/videos/trending",
            "/api/v1/users/{user_id}/videos",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}

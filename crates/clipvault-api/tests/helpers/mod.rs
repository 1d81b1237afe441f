//! Test helpers: build the router over in-memory collaborators.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use bytes::Bytes;
use clipvault_api::setup::routes::setup_routes;
use clipvault_api::state::AppState;
use clipvault_core::{Config, ServiceConfig, StorageBackend};
use clipvault_services::test_helpers::{
    InMemoryStorage, InMemoryVideoRepository, RecordingTranscodingTrigger,
};
use clipvault_services::{TranscodeDispatcher, VideoService};
use uuid::Uuid;

pub const USER_ID_HEADER: &str = "x-user-id";

pub struct TestApp {
    pub server: TestServer,
    pub repository: InMemoryVideoRepository,
    pub storage: InMemoryStorage,
    pub trigger: RecordingTranscodingTrigger,
    pub dispatcher: TranscodeDispatcher,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn test_config() -> Config {
    Config(Box::new(ServiceConfig {
        service_name: "clipvault-test".to_string(),
        environment: "test".to_string(),
        server_port: 0,
        cors_origins: vec!["*".to_string()],
        log_json: false,
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        db_timeout_seconds: 1,
        storage_backend: Some(StorageBackend::Local),
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_region: None,
        local_storage_path: Some("/tmp/clipvault-test".to_string()),
        local_storage_base_url: Some("https://cdn.example.com".to_string()),
        max_video_size_bytes: 1024 * 1024,
        transcoder_url: None,
        transcoder_timeout_seconds: 1,
        transcode_max_concurrent: 2,
    }))
}

pub async fn setup_test_app() -> TestApp {
    let config = test_config();
    let repository = InMemoryVideoRepository::new();
    let storage = InMemoryStorage::new();
    let trigger = RecordingTranscodingTrigger::new();
    let dispatcher = TranscodeDispatcher::spawn(Arc::new(trigger.clone()), Default::default());

    let video_service = VideoService::new(
        Arc::new(repository.clone()),
        Arc::new(storage.clone()),
        dispatcher.clone(),
    );
    let state = Arc::new(AppState {
        video_service,
        transcoder: dispatcher.clone(),
        config: config.clone(),
    });

    let app = setup_routes(&config, state).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        repository,
        storage,
        trigger,
        dispatcher,
    }
}

/// Multipart upload form with a `video_len`-byte payload.
pub fn upload_form(title: &str, video_len: usize) -> MultipartForm {
    MultipartForm::new()
        .add_text("title", title.to_string())
        .add_text("description", "integration clip")
        .add_text("duration_seconds", "15")
        .add_text("width", "1080")
        .add_text("height", "1920")
        .add_part(
            "video",
            Part::bytes(Bytes::from(vec![7u8; video_len]))
                .file_name("clip.mp4")
                .mime_type("video/mp4"),
        )
}

/// Upload a video as `user_id` and return its id.
pub async fn upload_video(client: &TestServer, user_id: Uuid, title: &str) -> Uuid {
    let response = client
        .post("/api/v1/videos")
        .add_header(USER_ID_HEADER, user_id.to_string())
        .multipart(upload_form(title, 64))
        .await;
    assert_eq!(response.status_code(), 201);

    let body: serde_json::Value = response.json();
    Uuid::parse_str(body["video_id"].as_str().expect("Expected video_id in response"))
        .expect("Invalid UUID in upload response")
}

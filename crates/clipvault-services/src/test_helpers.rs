//! In-memory collaborators for exercising `VideoService` without Postgres, object
//! storage or a transcoder. Each double can be switched into a failing mode.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use clipvault_core::models::{EncodingStatus, NewVideo, Video};
use clipvault_core::{AppError, ObjectKind, StorageBackend};
use clipvault_db::VideoRepository;
use clipvault_storage::keys::object_key;
use clipvault_storage::{Storage, StorageError, StorageResult, StoredObject};
use clipvault_worker::{TranscodeJob, TranscodingTrigger};
use uuid::Uuid;

/// A valid upload of `video_len` bytes owned by `user_id`, titled "A".
pub fn test_upload(user_id: Uuid, video_len: usize) -> NewVideo {
    NewVideo {
        user_id,
        title: "A".to_string(),
        description: "test clip".to_string(),
        video: Bytes::from(vec![0u8; video_len]),
        thumbnail: None,
        duration_seconds: 15,
        width: 1080,
        height: 1920,
        original_video_id: None,
    }
}

/// Video repository backed by a `HashMap`
#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<Mutex<HashMap<Uuid, Video>>>,
    fail_writes: Arc<AtomicBool>,
    delete_calls: Arc<AtomicUsize>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write (create, save, delete, counters, status) fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Mutate a stored record directly, bypassing the service.
    pub fn edit(&self, id: Uuid, f: impl FnOnce(&mut Video)) {
        if let Some(video) = self.videos.lock().unwrap().get_mut(&id) {
            f(video);
        }
    }

    pub fn len(&self) -> usize {
        self.videos.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn delete_count(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    fn check_write(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("simulated repository failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create(&self, video: &Video) -> Result<(), AppError> {
        self.check_write()?;
        self.videos
            .lock()
            .unwrap()
            .insert(video.id, video.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.videos.lock().unwrap().get(&id).cloned())
    }

    async fn list_by_owner(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Video>, AppError> {
        let mut videos: Vec<Video> = self
            .videos
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.user_id == user_id && v.is_public)
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn save(&self, video: &Video) -> Result<(), AppError> {
        self.check_write()?;
        let mut videos = self.videos.lock().unwrap();
        if let Some(existing) = videos.get_mut(&video.id) {
            existing.title = video.title.clone();
            existing.description = video.description.clone();
            existing.is_public = video.is_public;
            existing.allow_comments = video.allow_comments;
            existing.allow_duet = video.allow_duet;
            existing.allow_stitch = video.allow_stitch;
            existing.updated_at = video.updated_at;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check_write()?;
        Ok(self.videos.lock().unwrap().remove(&id).is_some())
    }

    async fn list_trending(&self, limit: i64) -> Result<Vec<Video>, AppError> {
        let mut videos: Vec<Video> = self
            .videos
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.is_public && v.encoding_status == EncodingStatus::Completed)
            .cloned()
            .collect();
        videos.sort_by(|a, b| {
            b.view_count
                .cmp(&a.view_count)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        videos.truncate(limit.max(0) as usize);
        Ok(videos)
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<bool, AppError> {
        self.check_write()?;
        match self.videos.lock().unwrap().get_mut(&id) {
            Some(video) => {
                video.increment_view_count();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_status(&self, id: Uuid, status: EncodingStatus) -> Result<bool, AppError> {
        self.check_write()?;
        match self.videos.lock().unwrap().get_mut(&id) {
            Some(video) if video.encoding_status.can_transition_to(status) => {
                if status == EncodingStatus::Completed {
                    video.mark_completed();
                } else {
                    video.mark_failed();
                }
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Object store backed by a `HashMap`, addressed with the real key layout.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    objects: Arc<Mutex<HashMap<String, Bytes>>>,
    failing_kinds: Arc<Mutex<HashSet<ObjectKind>>>,
    fail_deletes: Arc<AtomicBool>,
    put_calls: Arc<AtomicUsize>,
    delete_calls: Arc<AtomicUsize>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `put` of `kind` fail.
    pub fn fail_puts_of(&self, kind: ObjectKind) {
        self.failing_kinds.lock().unwrap().insert(kind);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn has_object(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn put_count(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn delete_count(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn put(
        &self,
        video_id: Uuid,
        kind: ObjectKind,
        data: Bytes,
    ) -> StorageResult<StoredObject> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_kinds.lock().unwrap().contains(&kind) {
            return Err(StorageError::UploadFailed(format!(
                "simulated {} upload failure",
                kind
            )));
        }

        let key = object_key(video_id, kind);
        let size_bytes = data.len() as u64;
        self.objects.lock().unwrap().insert(key.clone(), data);
        Ok(StoredObject {
            url: format!("https://cdn.example.com/{}", key),
            key,
            size_bytes,
        })
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed(
                "simulated delete failure".to_string(),
            ));
        }
        self.objects.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.has_object(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Transcoding trigger that records every job it receives.
#[derive(Clone, Default)]
pub struct RecordingTranscodingTrigger {
    calls: Arc<Mutex<Vec<TranscodeJob>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingTranscodingTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `start` calls fail after being recorded.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<TranscodeJob> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscodingTrigger for RecordingTranscodingTrigger {
    async fn start(&self, video_id: Uuid, location: &str) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(TranscodeJob {
            video_id,
            location: location.to_string(),
        });
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("simulated transcoder failure");
        }
        Ok(())
    }
}

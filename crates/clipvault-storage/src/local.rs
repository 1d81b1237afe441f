use crate::keys::{is_safe_key, object_key};
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::{ObjectKind, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for object storage (e.g., "/var/lib/clipvault")
    /// * `base_url` - Base URL the directory is served from (e.g., "http://localhost:8080/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path, refusing keys that leave the base directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if !is_safe_key(storage_key) {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(storage_key);

        if let Ok(canonical) = path.canonicalize() {
            let base_canonical = self.base_path.canonicalize().map_err(|e| {
                StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
            })?;
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(
        &self,
        video_id: Uuid,
        kind: ObjectKind,
        data: Bytes,
    ) -> StorageResult<StoredObject> {
        let key = object_key(video_id, kind);
        let path = self.key_to_path(&key)?;
        let size = data.len() as u64;

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.generate_url(&key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            kind = %kind,
            content_type = kind.content_type(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StoredObject {
            key,
            url,
            size_bytes: size,
        })
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        // Drop the per-video directory once it is empty; failure just leaves it behind.
        if let Some(parent) = path.parent() {
            if parent != self.base_path {
                let _ = fs::remove_dir(parent).await;
            }
        }

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn test_storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:8080/media/".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_storage_put_video() {
        let dir = tempdir().unwrap();
        let storage = test_storage(dir.path()).await;
        let video_id = Uuid::new_v4();

        let stored = storage
            .put(video_id, ObjectKind::OriginalVideo, Bytes::from_static(b"mp4 data"))
            .await
            .unwrap();

        assert_eq!(stored.key, format!("videos/{}/original.mp4", video_id));
        assert_eq!(
            stored.url,
            format!("http://localhost:8080/media/videos/{}/original.mp4", video_id)
        );
        assert_eq!(stored.size_bytes, 8);

        let on_disk = std::fs::read(dir.path().join(&stored.key)).unwrap();
        assert_eq!(on_disk, b"mp4 data");
    }

    #[tokio::test]
    async fn test_local_storage_put_thumbnail_shares_prefix() {
        let dir = tempdir().unwrap();
        let storage = test_storage(dir.path()).await;
        let video_id = Uuid::new_v4();

        let video = storage
            .put(video_id, ObjectKind::OriginalVideo, Bytes::from_static(b"v"))
            .await
            .unwrap();
        let thumb = storage
            .put(video_id, ObjectKind::Thumbnail, Bytes::from_static(b"t"))
            .await
            .unwrap();

        assert!(thumb.key.ends_with("thumbnail.jpg"));
        assert_eq!(
            video.key.rsplit_once('/').map(|(p, _)| p),
            thumb.key.rsplit_once('/').map(|(p, _)| p)
        );
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = test_storage(dir.path()).await;

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_local_storage_delete_nonexistent() {
        let dir = tempdir().unwrap();
        let storage = test_storage(dir.path()).await;

        let result = storage.delete("videos/missing/original.mp4").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_local_storage_delete_then_exists() {
        let dir = tempdir().unwrap();
        let storage = test_storage(dir.path()).await;
        let video_id = Uuid::new_v4();

        let stored = storage
            .put(video_id, ObjectKind::OriginalVideo, Bytes::from_static(b"v"))
            .await
            .unwrap();
        assert!(storage.exists(&stored.key).await.unwrap());

        storage.delete(&stored.key).await.unwrap();
        assert!(!storage.exists(&stored.key).await.unwrap());
    }

    #[tokio::test]
    async fn test_backend_type() {
        let dir = tempdir().unwrap();
        let storage = test_storage(dir.path()).await;
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }
}

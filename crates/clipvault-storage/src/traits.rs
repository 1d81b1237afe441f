//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::{ObjectKind, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Location of an object after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Internal key, used to address the object for deletion.
    pub key: String,
    /// Publicly reachable URL of the object.
    pub url: String,
    pub size_bytes: u64,
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait so the
/// lifecycle service never couples to a specific backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store `data` as the object of `kind` for `video_id`.
    ///
    /// The key is derived from the video id and kind (see [`crate::keys::object_key`]),
    /// so writing the same kind twice for one video overwrites the object.
    async fn put(&self, video_id: Uuid, kind: ObjectKind, data: Bytes)
        -> StorageResult<StoredObject>;

    /// Delete an object by its storage key. Deleting a missing object succeeds.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if an object exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

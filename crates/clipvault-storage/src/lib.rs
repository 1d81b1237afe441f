//! Clipvault Storage Library
//!
//! Binary object storage for video payloads and thumbnails, with S3 and local
//! filesystem backends behind a single `Storage` trait.
//!
//! # Storage key format
//!
//! Every object belonging to a video lives under that video's prefix:
//!
//! - **Original video**: `videos/{video_id}/original.mp4`
//! - **Thumbnail**: `videos/{video_id}/thumbnail.jpg`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use clipvault_core::{ObjectKind, StorageBackend};
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};

//! Clipvault Services Layer
//!
//! Hosts the video lifecycle orchestration. `VideoService` coordinates the binary
//! store, the metadata repository and the transcoding dispatcher, and owns the
//! failure policy of every multi-step workflow. Keep thin HTTP handling in
//! clipvault-api.

pub mod pagination;
pub mod video;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use clipvault_storage::{
    create_storage, LocalStorage, S3Storage, Storage, StorageBackend, StorageError, StorageResult,
};
pub use clipvault_worker::{
    HttpTranscodingTrigger, LoggingTranscodingTrigger, TranscodeDispatcher,
    TranscodeDispatcherConfig, TranscodeJob, TranscodingTrigger,
};
pub use video::VideoService;

//! Clipvault Database Library
//!
//! Persistence of video metadata records. The `VideoRepository` trait is the seam the
//! lifecycle service depends on; `PgVideoRepository` is the PostgreSQL implementation.

pub mod video;

pub use video::{PgVideoRepository, VideoRepository};

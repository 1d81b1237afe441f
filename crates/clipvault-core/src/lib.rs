//! Clipvault Core Library
//!
//! This crate provides the video domain model, error types and configuration
//! shared across all Clipvault components.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, ServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::{ObjectKind, StorageBackend};

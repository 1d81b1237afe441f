use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Defined in core because configuration selects it before any storage crate is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

/// The kind of binary object stored for a video.
///
/// The kind decides the object name inside the video's key prefix and the
/// content type the object is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    OriginalVideo,
    Thumbnail,
}

impl ObjectKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ObjectKind::OriginalVideo => "original.mp4",
            ObjectKind::Thumbnail => "thumbnail.jpg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ObjectKind::OriginalVideo => "video/mp4",
            ObjectKind::Thumbnail => "image/jpeg",
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ObjectKind::OriginalVideo => write!(f, "original_video"),
            ObjectKind::Thumbnail => write!(f, "thumbnail"),
        }
    }
}

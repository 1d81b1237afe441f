//! Shared key generation for storage backends.

use clipvault_core::ObjectKind;
use uuid::Uuid;

/// Generate the storage key for an object of `kind` belonging to `video_id`.
///
/// All backends must use this format so that a key recorded by one deployment
/// stays addressable after a backend switch.
pub fn object_key(video_id: Uuid, kind: ObjectKind) -> String {
    format!("videos/{}/{}", video_id, kind.file_name())
}

/// Reject keys that could escape the storage root.
pub fn is_safe_key(key: &str) -> bool {
    !key.is_empty() && !key.contains("..") && !key.starts_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_is_deterministic() {
        let id = Uuid::parse_str("9b2f6a52-3c59-4f3e-9d4c-2b1f7a9e0c11").unwrap();
        assert_eq!(
            object_key(id, ObjectKind::OriginalVideo),
            "videos/9b2f6a52-3c59-4f3e-9d4c-2b1f7a9e0c11/original.mp4"
        );
        assert_eq!(
            object_key(id, ObjectKind::Thumbnail),
            "videos/9b2f6a52-3c59-4f3e-9d4c-2b1f7a9e0c11/thumbnail.jpg"
        );
    }

    #[test]
    fn test_is_safe_key() {
        assert!(is_safe_key("videos/abc/original.mp4"));
        assert!(!is_safe_key(""));
        assert!(!is_safe_key("/etc/passwd"));
        assert!(!is_safe_key("videos/../../etc/passwd"));
    }
}

pub mod health;
pub mod videos;

use clipvault_core::AppError;
use uuid::Uuid;

use crate::error::HttpAppError;

/// Parse a UUID path segment, rejecting malformed ids with 400.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, HttpAppError> {
    Uuid::parse_str(raw).map_err(|_| {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid {}: '{}' is not a UUID",
            what, raw
        )))
    })
}

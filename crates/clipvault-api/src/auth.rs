//! Caller identity.
//!
//! Authentication happens at the gateway; this service trusts the user id the
//! gateway forwards in `x-user-id`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use clipvault_core::AppError;
use uuid::Uuid;

use crate::constants::USER_ID_HEADER;
use crate::error::HttpAppError;

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserIdentity(pub Uuid);

impl<S> FromRequestParts<S> for UserIdentity
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts.headers.get(USER_ID_HEADER).ok_or_else(|| {
            HttpAppError(AppError::Unauthorized(format!(
                "Missing {} header",
                USER_ID_HEADER
            )))
        })?;

        let user_id = value
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .ok_or_else(|| {
                HttpAppError(AppError::InvalidInput(format!(
                    "{} must be a valid UUID",
                    USER_ID_HEADER
                )))
            })?;

        Ok(UserIdentity(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;

    async fn extract(header: Option<&str>) -> Result<UserIdentity, HttpAppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        UserIdentity::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_header() {
        let id = Uuid::new_v4();
        let identity = extract(Some(&id.to_string())).await.unwrap();
        assert_eq!(identity, UserIdentity(id));
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let err = extract(None).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_header_is_bad_request() {
        let err = extract(Some("not-a-uuid")).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}

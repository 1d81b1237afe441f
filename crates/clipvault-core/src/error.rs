//! Error types module
//!
//! Every failure of the video lifecycle ends up as an `AppError`. How a variant is
//! presented to callers (status, code, retry hint, redaction, log level) lives in one
//! `Presentation` per variant, exposed through `ErrorMetadata`.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Caller mistakes
    Debug,
    /// Well-formed requests that were refused
    Warn,
    /// Failures of the service or its collaborators
    Error,
}

/// How an error is presented to HTTP callers and logs.
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Machine-readable code, e.g. `"NOT_FOUND"`
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same request may succeed
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Message safe to show the caller
    fn client_message(&self) -> String;

    /// Sensitive errors never expose their details
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::InvalidInput(format!("Malformed id: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

struct Presentation {
    status: u16,
    code: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

impl Presentation {
    const fn caller(status: u16, code: &'static str, action: &'static str, level: LogLevel) -> Self {
        Presentation {
            status,
            code,
            recoverable: false,
            action: Some(action),
            sensitive: false,
            level,
        }
    }

    const fn server(code: &'static str) -> Self {
        Presentation {
            status: 500,
            code,
            recoverable: true,
            action: Some("Retry after a short delay"),
            sensitive: true,
            level: LogLevel::Error,
        }
    }
}

static DATABASE: Presentation = Presentation::server("DATABASE_ERROR");
static INTERNAL: Presentation = Presentation::server("INTERNAL_ERROR");
static INVALID_INPUT: Presentation = Presentation::caller(
    400,
    "INVALID_INPUT",
    "Check request parameters and try again",
    LogLevel::Debug,
);
static BAD_REQUEST: Presentation = Presentation::caller(
    400,
    "BAD_REQUEST",
    "Check request format and parameters",
    LogLevel::Debug,
);
static NOT_FOUND: Presentation = Presentation::caller(
    404,
    "NOT_FOUND",
    "Verify the resource ID exists",
    LogLevel::Debug,
);
static FORBIDDEN: Presentation = Presentation::caller(
    403,
    "FORBIDDEN",
    "Only the owner of the video may perform this action",
    LogLevel::Warn,
);
static UNAUTHORIZED: Presentation = Presentation::caller(
    401,
    "UNAUTHORIZED",
    "Send the request through the gateway with a user identity",
    LogLevel::Debug,
);
static CONFLICT: Presentation = Presentation::caller(
    409,
    "CONFLICT",
    "Fetch the current state of the resource before retrying",
    LogLevel::Warn,
);
static PAYLOAD_TOO_LARGE: Presentation = Presentation::caller(
    413,
    "PAYLOAD_TOO_LARGE",
    "Reduce the upload size below MAX_VIDEO_SIZE_MB",
    LogLevel::Debug,
);

impl AppError {
    fn presentation(&self) -> &'static Presentation {
        match self {
            AppError::Database(_) => &DATABASE,
            AppError::InvalidInput(_) => &INVALID_INPUT,
            AppError::BadRequest(_) => &BAD_REQUEST,
            AppError::NotFound(_) => &NOT_FOUND,
            AppError::Forbidden(_) => &FORBIDDEN,
            AppError::Unauthorized(_) => &UNAUTHORIZED,
            AppError::Conflict(_) => &CONFLICT,
            AppError::PayloadTooLarge(_) => &PAYLOAD_TOO_LARGE,
            AppError::Internal(_) | AppError::InternalWithSource { .. } => &INTERNAL,
        }
    }

    /// Variant name shown in non-production error bodies
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Database(_) => "Database",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::BadRequest(_) => "BadRequest",
            AppError::NotFound(_) => "NotFound",
            AppError::Forbidden(_) => "Forbidden",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Conflict(_) => "Conflict",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// The error followed by up to five of its causes.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();
        let mut causes = std::iter::successors(self.source(), |&err| err.source());
        for cause in causes.by_ref().take(5) {
            details.push_str(&format!("\n  Caused by: {}", cause));
        }
        if causes.next().is_some() {
            details.push_str("\n  ... (truncated)");
        }
        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.presentation().status
    }

    fn error_code(&self) -> &'static str {
        self.presentation().code
    }

    fn is_recoverable(&self) -> bool {
        self.presentation().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.presentation().action
    }

    fn is_sensitive(&self) -> bool {
        self.presentation().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.presentation().level
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
            AppError::InvalidInput(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Forbidden(msg)
            | AppError::Unauthorized(msg)
            | AppError::Conflict(msg)
            | AppError::PayloadTooLarge(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_metadata_database() {
        #[cfg(feature = "sqlx")]
        let err = AppError::from(sqlx::Error::PoolClosed);
        #[cfg(not(feature = "sqlx"))]
        let err = AppError::Database("pool closed".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(err.is_recoverable());
        assert_eq!(err.client_message(), "Failed to access database");
        assert!(err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn test_error_metadata_not_found() {
        let err = AppError::NotFound("Video not found".to_string());
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Video not found");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_error_metadata_forbidden() {
        let err = AppError::Forbidden("Not the owner".to_string());
        assert_eq!(err.http_status_code(), 403);
        assert_eq!(err.error_code(), "FORBIDDEN");
        assert!(!err.is_recoverable());
        assert_eq!(err.client_message(), "Not the owner");
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_error_metadata_conflict() {
        let err = AppError::Conflict("already completed".to_string());
        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.error_code(), "CONFLICT");
        assert!(!err.is_sensitive());
    }

    #[test]
    fn test_error_metadata_payload_too_large() {
        let err = AppError::PayloadTooLarge("length limit exceeded".to_string());
        assert_eq!(err.http_status_code(), 413);
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_internal_variants_share_presentation() {
        let plain = AppError::Internal("bucket clipvault-videos unreachable".to_string());
        let sourced = AppError::from(anyhow::anyhow!("bucket clipvault-videos unreachable"));
        for err in [plain, sourced] {
            assert_eq!(err.http_status_code(), 500);
            assert_eq!(err.error_code(), "INTERNAL_ERROR");
            assert_eq!(err.client_message(), "Internal server error");
            assert_eq!(err.error_type(), "Internal");
            assert!(err.is_sensitive());
        }
    }

    #[test]
    fn test_uuid_error_is_invalid_input() {
        let err: AppError = uuid::Uuid::parse_str("not-a-uuid").unwrap_err().into();
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_type(), "InvalidInput");
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let source = anyhow::anyhow!("connection reset").context("transcoder unreachable");
        let err = AppError::from(source);
        let details = err.detailed_message();
        assert!(details.contains("Internal error with source"));
        assert!(details.contains("Caused by"));
        assert!(!details.contains("truncated"));
    }

    #[test]
    fn test_detailed_message_truncates_long_chains() {
        let mut source = anyhow::anyhow!("root cause");
        for layer in 0..7 {
            source = source.context(format!("layer {}", layer));
        }
        let details = AppError::from(source).detailed_message();
        assert_eq!(details.matches("Caused by").count(), 5);
        assert!(details.ends_with("... (truncated)"));
    }

    #[test]
    fn test_error_metadata_suggested_actions() {
        let err1 = AppError::Internal("boom".to_string());
        assert_eq!(err1.suggested_action(), Some("Retry after a short delay"));

        let err2 = AppError::NotFound("test".to_string());
        assert_eq!(
            err2.suggested_action(),
            Some("Verify the resource ID exists")
        );

        let err3 = AppError::InvalidInput("test".to_string());
        assert_eq!(
            err3.suggested_action(),
            Some("Check request parameters and try again")
        );
    }
}

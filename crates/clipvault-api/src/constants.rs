//! API version and path constants.

/// Prefix for all versioned API routes.
pub const API_PREFIX: &str = "/api/v1";

/// Caller identity header, set by the gateway in front of this service.
pub const USER_ID_HEADER: &str = "x-user-id";

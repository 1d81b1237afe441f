//! Clipvault API library
//!
//! HTTP adapter over the video lifecycle service. Exposes the router and startup
//! wiring so the binary and integration tests share one setup path.

pub mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;

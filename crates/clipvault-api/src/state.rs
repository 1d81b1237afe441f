//! Application state shared by all handlers.

use clipvault_core::Config;
use clipvault_services::{TranscodeDispatcher, VideoService};

pub struct AppState {
    pub video_service: VideoService,
    /// Kept so shutdown can drain in-flight transcode triggers.
    pub transcoder: TranscodeDispatcher,
    pub config: Config,
}

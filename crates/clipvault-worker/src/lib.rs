//! Clipvault Worker Library
//!
//! Starts downstream transcoding for freshly uploaded videos. A `TranscodingTrigger`
//! performs the actual notification; the `TranscodeDispatcher` runs triggers detached
//! from the request that produced them.

pub mod dispatcher;
pub mod trigger;

pub use dispatcher::{TranscodeDispatcher, TranscodeDispatcherConfig, TranscodeJob};
pub use trigger::{HttpTranscodingTrigger, LoggingTranscodingTrigger, TranscodingTrigger};

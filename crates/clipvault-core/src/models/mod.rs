pub mod video;

pub use video::{EncodingStatus, NewVideo, Video, VideoResponse, VideoUpdate};

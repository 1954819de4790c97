// Library exports for the binary and for testing
pub mod api;
pub mod channel_cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod images;
pub mod outlier;
pub mod prompt;
pub mod studio;
pub mod video_id;
pub mod youtube;

pub use error::{ThumbError, ThumbResult};
pub use outlier::{outlier_score, ChannelSample, VideoStats};
pub use video_id::{extract_video_id, VideoId};

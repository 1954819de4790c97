use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of every canonical YouTube video id.
pub const VIDEO_ID_LEN: usize = 11;

/// Matches the five URL shapes that carry a video id:
/// - youtube.com/watch?v=<id> (v may follow other query parameters)
/// - youtube.com/embed/<id> and youtube.com/v/<id>
/// - youtube.com/<anything>/<id> (shorts, live, user paths)
/// - youtu.be/<id>
///
/// The id must be followed by a non-id character or the end of input, so a
/// 12-character run never yields a truncated id.
static VIDEO_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?i:https?://)?(?i:www\.)?(?:(?i:youtube\.com)/(?:[^#\s]*?[?&]v=|(?:[^/\s?#]+/)+)|(?i:youtu\.be)/)([A-Za-z0-9_-]{11})(?:[^A-Za-z0-9_-]|$)",
    )
    .expect("video url pattern is valid")
});

/// Canonical 11-character video identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VideoId(String);

impl VideoId {
    /// Accept a bare id (no URL around it).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.len() == VIDEO_ID_LEN && raw.chars().all(is_id_char) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical watch URL for this id.
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for VideoId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        VideoId::parse(&value).ok_or_else(|| format!("invalid video id: {:?}", value))
    }
}

impl From<VideoId> for String {
    fn from(id: VideoId) -> Self {
        id.0
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Extract the video id from a free-form URL string.
///
/// Returns `None` for anything that is not one of the known URL shapes,
/// including partial URLs and ids of the wrong length. Never panics.
pub fn extract_video_id(url: &str) -> Option<VideoId> {
    VIDEO_URL_RE
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| VideoId(m.as_str().to_string()))
}

/// Accept either a URL or a bare id, as users paste both.
pub fn resolve_video_id(input: &str) -> Option<VideoId> {
    extract_video_id(input).or_else(|| VideoId::parse(input))
}

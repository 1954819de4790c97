use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ThumbError, ThumbResult};
use crate::video_id::VideoId;

const PROVIDER: &str = "YouTube Data API";

/// Maximum ids per `videos.list` call and results per `search.list` call.
pub const MAX_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Thumbnail URLs at the resolutions YouTube may report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
    pub standard: Option<Thumbnail>,
    pub maxres: Option<Thumbnail>,
}

impl Thumbnails {
    /// Highest resolution available.
    pub fn best(&self) -> Option<&Thumbnail> {
        self.maxres
            .as_ref()
            .or(self.standard.as_ref())
            .or(self.high.as_ref())
            .or(self.medium.as_ref())
            .or(self.default.as_ref())
    }
}

/// Provider counts. `None` means the provider did not report the figure
/// (hidden likes, disabled comments); it is never folded into zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStatistics {
    pub view_count: Option<u64>,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub id: VideoId,
    pub title: String,
    pub channel_id: String,
    pub channel_title: String,
    pub published_at: Option<DateTime<Utc>>,
    pub thumbnails: Thumbnails,
    pub statistics: VideoStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: VideoId,
    pub title: String,
    pub channel_id: String,
    pub channel_title: String,
    pub thumbnails: Thumbnails,
}

/// Source of video metadata and channel listings.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    async fn search_videos(&self, query: &str, max_results: u32) -> ThumbResult<Vec<SearchHit>>;

    /// Details for each id the provider knows; unknown ids are left out.
    async fn video_details(&self, ids: &[VideoId]) -> ThumbResult<Vec<VideoDetails>>;

    /// The channel's most recent video ids, newest first.
    async fn recent_channel_videos(&self, channel_id: &str, limit: u32) -> ThumbResult<Vec<VideoId>>;
}

/// YouTube Data API v3 client.
pub struct YouTubeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> ThumbResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> ThumbResult<Value> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("GET {} {:?}", url, params);

        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ThumbError::from_response(PROVIDER, response).await);
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl VideoProvider for YouTubeClient {
    async fn search_videos(&self, query: &str, max_results: u32) -> ThumbResult<Vec<SearchHit>> {
        let max_results = max_results.clamp(1, MAX_PAGE_SIZE as u32);
        let data = self
            .get(
                "search",
                &[
                    ("part", "snippet".to_string()),
                    ("type", "video".to_string()),
                    ("q", query.to_string()),
                    ("maxResults", max_results.to_string()),
                ],
            )
            .await?;
        Ok(parse_search_response(&data))
    }

    async fn video_details(&self, ids: &[VideoId]) -> ThumbResult<Vec<VideoDetails>> {
        let mut details = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_PAGE_SIZE) {
            let joined = chunk
                .iter()
                .map(VideoId::as_str)
                .collect::<Vec<_>>()
                .join(",");
            let data = self
                .get(
                    "videos",
                    &[("part", "snippet,statistics".to_string()), ("id", joined)],
                )
                .await?;
            details.extend(parse_videos_response(&data));
        }
        Ok(details)
    }

    async fn recent_channel_videos(&self, channel_id: &str, limit: u32) -> ThumbResult<Vec<VideoId>> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE as u32);
        let data = self
            .get(
                "search",
                &[
                    ("part", "id".to_string()),
                    ("channelId", channel_id.to_string()),
                    ("order", "date".to_string()),
                    ("type", "video".to_string()),
                    ("maxResults", limit.to_string()),
                ],
            )
            .await?;
        Ok(parse_channel_listing(&data))
    }
}

/// Parse a count that YouTube reports as a decimal string. Anything else
/// (absent, "unavailable", negative) is `None`.
fn parse_count(value: &Value) -> Option<u64> {
    value
        .as_str()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .or_else(|| value.as_u64())
}

fn parse_thumbnail(value: &Value) -> Option<Thumbnail> {
    let url = value["url"].as_str()?;
    Some(Thumbnail {
        url: url.to_string(),
        width: value["width"].as_u64().and_then(|w| u32::try_from(w).ok()),
        height: value["height"].as_u64().and_then(|h| u32::try_from(h).ok()),
    })
}

fn parse_thumbnails(value: &Value) -> Thumbnails {
    Thumbnails {
        default: parse_thumbnail(&value["default"]),
        medium: parse_thumbnail(&value["medium"]),
        high: parse_thumbnail(&value["high"]),
        standard: parse_thumbnail(&value["standard"]),
        maxres: parse_thumbnail(&value["maxres"]),
    }
}

fn parse_statistics(value: &Value) -> VideoStatistics {
    VideoStatistics {
        view_count: parse_count(&value["viewCount"]),
        like_count: parse_count(&value["likeCount"]),
        comment_count: parse_count(&value["commentCount"]),
    }
}

fn str_field(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}

fn items(data: &Value) -> &[Value] {
    data["items"].as_array().map(Vec::as_slice).unwrap_or_default()
}

/// Parse a `search.list` response with snippets.
pub fn parse_search_response(data: &Value) -> Vec<SearchHit> {
    items(data)
        .iter()
        .filter_map(|item| {
            let id = item["id"]["videoId"].as_str().and_then(VideoId::parse);
            if id.is_none() {
                warn!("Skipping search result without a video id");
            }
            let snippet = &item["snippet"];
            Some(SearchHit {
                id: id?,
                title: str_field(&snippet["title"]),
                channel_id: str_field(&snippet["channelId"]),
                channel_title: str_field(&snippet["channelTitle"]),
                thumbnails: parse_thumbnails(&snippet["thumbnails"]),
            })
        })
        .collect()
}

/// Parse a `videos.list` response with `snippet,statistics` parts.
pub fn parse_videos_response(data: &Value) -> Vec<VideoDetails> {
    items(data)
        .iter()
        .filter_map(|item| {
            let id = item["id"].as_str().and_then(VideoId::parse)?;
            let snippet = &item["snippet"];
            let published_at = snippet["publishedAt"]
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|dt| dt.with_timezone(&Utc));
            Some(VideoDetails {
                id,
                title: str_field(&snippet["title"]),
                channel_id: str_field(&snippet["channelId"]),
                channel_title: str_field(&snippet["channelTitle"]),
                published_at,
                thumbnails: parse_thumbnails(&snippet["thumbnails"]),
                statistics: parse_statistics(&item["statistics"]),
            })
        })
        .collect()
}

/// Parse a `search.list` response requested with `part=id`.
pub fn parse_channel_listing(data: &Value) -> Vec<VideoId> {
    items(data)
        .iter()
        .filter_map(|item| item["id"]["videoId"].as_str().and_then(VideoId::parse))
        .collect()
}

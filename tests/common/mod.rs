#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use thumbcraft::images::{GeneratedImage, ImageModel, ImageProvider};
use thumbcraft::prompt::PromptProvider;
use thumbcraft::youtube::{SearchHit, Thumbnails, VideoDetails, VideoProvider, VideoStatistics};
use thumbcraft::{ThumbError, ThumbResult, VideoId};

pub fn vid(raw: &str) -> VideoId {
    VideoId::parse(raw).expect("test ids are 11 characters")
}

pub fn video(id: &str, channel_id: &str, views: Option<u64>) -> VideoDetails {
    VideoDetails {
        id: vid(id),
        title: format!("Video {}", id),
        channel_id: channel_id.to_string(),
        channel_title: format!("Channel {}", channel_id),
        published_at: None,
        thumbnails: Thumbnails::default(),
        statistics: VideoStatistics {
            view_count: views,
            like_count: None,
            comment_count: None,
        },
    }
}

/// In-memory video provider that counts how often it is called.
#[derive(Default)]
pub struct FakeVideos {
    videos: HashMap<String, VideoDetails>,
    channels: HashMap<String, Vec<VideoId>>,
    search_results: Vec<String>,
    pub search_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
    pub channel_calls: AtomicUsize,
}

impl FakeVideos {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(mut self, details: VideoDetails) -> Self {
        self.videos.insert(details.id.to_string(), details);
        self
    }

    /// Register a channel's recent uploads (newest first) with their views.
    pub fn with_channel(mut self, channel_id: &str, uploads: &[(&str, Option<u64>)]) -> Self {
        let mut ids = Vec::new();
        for (id, views) in uploads {
            ids.push(vid(id));
            self = self.with_video(video(id, channel_id, *views));
        }
        self.channels.insert(channel_id.to_string(), ids);
        self
    }

    pub fn with_search_results(mut self, ids: &[&str]) -> Self {
        self.search_results = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn channel_calls(&self) -> usize {
        self.channel_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoProvider for FakeVideos {
    async fn search_videos(&self, _query: &str, max_results: u32) -> ThumbResult<Vec<SearchHit>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .search_results
            .iter()
            .take(max_results as usize)
            .filter_map(|id| self.videos.get(id))
            .map(|v| SearchHit {
                id: v.id.clone(),
                title: v.title.clone(),
                channel_id: v.channel_id.clone(),
                channel_title: v.channel_title.clone(),
                thumbnails: v.thumbnails.clone(),
            })
            .collect())
    }

    async fn video_details(&self, ids: &[VideoId]) -> ThumbResult<Vec<VideoDetails>> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ids
            .iter()
            .filter_map(|id| self.videos.get(id.as_str()).cloned())
            .collect())
    }

    async fn recent_channel_videos(&self, channel_id: &str, limit: u32) -> ThumbResult<Vec<VideoId>> {
        self.channel_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .channels
            .get(channel_id)
            .map(|ids| ids.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }
}

/// What the fake image provider does for a given query.
#[derive(Clone)]
pub enum ImageReply {
    Images(Vec<&'static str>),
    Empty,
    Fail,
}

/// Image provider with scripted replies per query; unknown queries come
/// back empty.
#[derive(Default)]
pub struct FakeImages {
    replies: HashMap<String, ImageReply>,
    pub queries: Mutex<Vec<String>>,
}

impl FakeImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, query: &str, reply: ImageReply) -> Self {
        self.replies.insert(query.to_string(), reply);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageProvider for FakeImages {
    async fn generate(
        &self,
        query: &str,
        _model: ImageModel,
        count: u32,
    ) -> ThumbResult<Vec<GeneratedImage>> {
        self.queries.lock().unwrap().push(query.to_string());
        match self.replies.get(query).cloned().unwrap_or(ImageReply::Empty) {
            ImageReply::Images(urls) => Ok(urls
                .into_iter()
                .take(count as usize)
                .map(|u| GeneratedImage { url: u.to_string() })
                .collect()),
            ImageReply::Empty => Ok(Vec::new()),
            ImageReply::Fail => Err(ThumbError::Provider {
                provider: "Freepik",
                status: 500,
                message: "scripted failure".to_string(),
            }),
        }
    }
}

/// Prompt provider that either echoes a fixed prompt or fails.
pub struct FakePrompts {
    pub reply: Option<String>,
    pub calls: AtomicUsize,
}

impl FakePrompts {
    pub fn answering(prompt: &str) -> Self {
        Self {
            reply: Some(prompt.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PromptProvider for FakePrompts {
    async fn draft_prompt(&self, _title: &str) -> ThumbResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().ok_or(ThumbError::Provider {
            provider: "OpenAI",
            status: 503,
            message: "scripted failure".to_string(),
        })
    }
}

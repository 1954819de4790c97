//! The pipeline behind the CLI and the REST API: fetch metadata, score it
//! against the channel baseline, and turn titles into thumbnail variations.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::channel_cache::ChannelSampleCache;
use crate::config::Config;
use crate::error::{ThumbError, ThumbResult};
use crate::images::{generate_with_fallback, FreepikClient, ImageModel, ImageProvider, ThumbnailBatch};
use crate::outlier::{self, ChannelSample, OutlierScore, VideoStats};
use crate::prompt::{OpenAiPromptClient, PromptProvider};
use crate::video_id::{resolve_video_id, VideoId};
use crate::youtube::{VideoDetails, VideoProvider, YouTubeClient};

/// Limits and defaults the pipeline enforces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioSettings {
    pub channel_sample_size: u32,
    pub default_results: u32,
    pub max_results: u32,
    pub default_model: ImageModel,
    pub default_image_count: u32,
    pub max_image_count: u32,
    pub fallback_query: String,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for StudioSettings {
    fn from(config: &Config) -> Self {
        StudioSettings {
            channel_sample_size: config.youtube.channel_sample_size,
            default_results: config.youtube.default_results,
            max_results: config.youtube.max_results,
            default_model: config.images.default_model,
            default_image_count: config.images.default_count,
            max_image_count: config.images.max_count,
            fallback_query: config.images.fallback_query.clone(),
        }
    }
}

/// A video with its outlier score against its own channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredVideo {
    pub video: VideoDetails,
    pub outlier_score: f64,
    /// Number of recent videos the score was computed against. Zero means
    /// the score is the neutral default, not a measured one.
    pub sample_size: usize,
    pub channel_average: Option<f64>,
}

impl ScoredVideo {
    pub fn score(&self) -> OutlierScore {
        OutlierScore {
            value: self.outlier_score,
            sample_size: self.sample_size,
        }
    }

    /// One-line summary, e.g. `Title (1200 views, Outlier: 3.50x)`.
    pub fn caption(&self) -> String {
        let views = self
            .video
            .statistics
            .view_count
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        format!(
            "{} ({} views, Outlier: {:.2}x)",
            self.video.title, views, self.outlier_score
        )
    }
}

/// Where the thumbnail title comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThumbnailSource {
    /// A URL or bare id; the video's title is looked up
    Video(String),
    /// A title typed by the user
    Title(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailRequest {
    pub source: ThumbnailSource,
    pub model: Option<ImageModel>,
    pub count: Option<u32>,
    pub use_llm: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailOutcome {
    pub title: String,
    /// Whether the query was drafted by the prompt provider
    pub prompt_drafted: bool,
    #[serde(flatten)]
    pub batch: ThumbnailBatch,
}

pub struct Studio {
    videos: Option<Arc<dyn VideoProvider>>,
    prompts: Option<Arc<dyn PromptProvider>>,
    images: Option<Arc<dyn ImageProvider>>,
    cache: ChannelSampleCache,
    settings: StudioSettings,
}

impl Studio {
    pub fn new(settings: StudioSettings) -> Self {
        Self {
            videos: None,
            prompts: None,
            images: None,
            cache: ChannelSampleCache::disabled(),
            settings,
        }
    }

    pub fn with_videos(mut self, videos: Arc<dyn VideoProvider>) -> Self {
        self.videos = Some(videos);
        self
    }

    pub fn with_prompts(mut self, prompts: Arc<dyn PromptProvider>) -> Self {
        self.prompts = Some(prompts);
        self
    }

    pub fn with_images(mut self, images: Arc<dyn ImageProvider>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn with_cache(mut self, cache: ChannelSampleCache) -> Self {
        self.cache = cache;
        self
    }

    /// Build the HTTP clients for every provider that has a key configured.
    pub fn from_config(config: &Config) -> ThumbResult<Self> {
        let mut studio = Studio::new(StudioSettings::from(config));

        if config.cache.enabled {
            studio = studio.with_cache(ChannelSampleCache::new(Duration::from_secs(
                config.cache.ttl_seconds,
            )));
        }

        match config.get_youtube_api_key() {
            Some(key) => {
                let client = YouTubeClient::new(&config.youtube.base_url, key)?;
                studio = studio.with_videos(Arc::new(client));
            }
            None => warn!("YOUTUBE_API_KEY not set; search and analysis are unavailable"),
        }

        match config.get_freepik_api_key() {
            Some(key) => {
                let client = FreepikClient::new(&config.images.base_url, key)?;
                studio = studio.with_images(Arc::new(client));
            }
            None => warn!("FREEPIK_API_KEY not set; thumbnail generation is unavailable"),
        }

        if config.prompt.enabled {
            match config.get_openai_api_key() {
                Some(key) => {
                    let client = OpenAiPromptClient::new(
                        &config.prompt.base_url,
                        key,
                        &config.prompt.model,
                        config.prompt.temperature,
                    )?;
                    studio = studio.with_prompts(Arc::new(client));
                }
                None => debug!("OPENAI_API_KEY not set; titles are used as image queries"),
            }
        }

        Ok(studio)
    }

    pub fn settings(&self) -> &StudioSettings {
        &self.settings
    }

    fn videos(&self) -> ThumbResult<&dyn VideoProvider> {
        self.videos
            .as_deref()
            .ok_or(ThumbError::MissingApiKey("YOUTUBE_API_KEY"))
    }

    fn images(&self) -> ThumbResult<&dyn ImageProvider> {
        self.images
            .as_deref()
            .ok_or(ThumbError::MissingApiKey("FREEPIK_API_KEY"))
    }

    /// View counts of the channel's most recent videos. Videos whose view
    /// count is unavailable are left out of the sample.
    pub async fn channel_sample(&self, channel_id: &str) -> ThumbResult<ChannelSample> {
        if let Some(sample) = self.cache.get(channel_id).await {
            return Ok(sample);
        }

        let videos = self.videos()?;
        let recent = videos
            .recent_channel_videos(channel_id, self.settings.channel_sample_size)
            .await?;
        let sample: ChannelSample = if recent.is_empty() {
            ChannelSample::default()
        } else {
            videos
                .video_details(&recent)
                .await?
                .iter()
                .filter_map(|v| v.statistics.view_count)
                .collect()
        };

        debug!(
            "Channel {} sample: {} video(s), average {:?}",
            channel_id,
            sample.len(),
            sample.average()
        );
        self.cache.insert(channel_id, sample.clone()).await;
        Ok(sample)
    }

    fn score_against(video: VideoDetails, sample: &ChannelSample) -> ScoredVideo {
        let score = match video.statistics.view_count {
            Some(view_count) => outlier::score(VideoStats { view_count }, sample),
            None => OutlierScore::neutral(),
        };
        ScoredVideo {
            video,
            outlier_score: score.value,
            sample_size: score.sample_size,
            channel_average: sample.average(),
        }
    }

    /// Score an already-fetched video against its channel.
    pub async fn score_video(&self, video: VideoDetails) -> ThumbResult<ScoredVideo> {
        if video.statistics.view_count.is_none() {
            debug!("{} has no view count; using neutral score", video.id);
            return Ok(Self::score_against(video, &ChannelSample::default()));
        }
        let sample = self.channel_sample(&video.channel_id).await?;
        Ok(Self::score_against(video, &sample))
    }

    async fn fetch_video(&self, id: &VideoId) -> ThumbResult<VideoDetails> {
        self.videos()?
            .video_details(std::slice::from_ref(id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ThumbError::not_found(format!("video {}", id)))
    }

    /// Look up a pasted URL (or bare id) and score it.
    pub async fn analyze(&self, input: &str) -> ThumbResult<ScoredVideo> {
        let id = resolve_video_id(input)
            .ok_or_else(|| ThumbError::not_found(format!("no video id in {:?}", input)))?;
        info!("Analyzing video {}", id);
        let video = self.fetch_video(&id).await?;
        self.score_video(video).await
    }

    /// Keyword search, every hit scored against its own channel and sorted
    /// by descending outlier score.
    pub async fn search(&self, query: &str, max_results: Option<u32>) -> ThumbResult<Vec<ScoredVideo>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ThumbError::invalid_input("search query is empty"));
        }
        let max_results = max_results.unwrap_or(self.settings.default_results);
        if max_results == 0 || max_results > self.settings.max_results {
            return Err(ThumbError::invalid_input(format!(
                "number of results must be between 1 and {}",
                self.settings.max_results
            )));
        }

        let videos = self.videos()?;
        let hits = videos.search_videos(query, max_results).await?;
        info!("Search {:?} returned {} hit(s)", query, hits.len());
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<VideoId> = hits.iter().map(|h| h.id.clone()).collect();
        let details = videos.video_details(&ids).await?;

        let channels: BTreeSet<&str> = details.iter().map(|v| v.channel_id.as_str()).collect();
        let samples = try_join_all(channels.iter().map(|c| self.channel_sample(c))).await?;
        let samples: HashMap<&str, ChannelSample> = channels.iter().copied().zip(samples).collect();

        let mut scored: Vec<ScoredVideo> = details
            .iter()
            .map(|video| {
                let sample = samples
                    .get(video.channel_id.as_str())
                    .cloned()
                    .unwrap_or_default();
                Self::score_against(video.clone(), &sample)
            })
            .collect();

        scored.sort_by(|a, b| b.outlier_score.total_cmp(&a.outlier_score));
        Ok(scored)
    }

    /// Image query for a title: drafted by the prompt provider when asked
    /// and available, otherwise the title itself.
    pub async fn thumbnail_query(&self, title: &str, use_llm: bool) -> (String, bool) {
        if use_llm {
            if let Some(prompts) = &self.prompts {
                match prompts.draft_prompt(title).await {
                    Ok(prompt) => return (prompt, true),
                    Err(e) => warn!("Prompt drafting failed, using title: {}", e),
                }
            }
        }
        (title.to_string(), false)
    }

    /// Generate thumbnail variations for a video or a free title.
    pub async fn generate_thumbnails(&self, request: &ThumbnailRequest) -> ThumbResult<ThumbnailOutcome> {
        let count = request.count.unwrap_or(self.settings.default_image_count);
        if count == 0 || count > self.settings.max_image_count {
            return Err(ThumbError::invalid_input(format!(
                "number of images must be between 1 and {}",
                self.settings.max_image_count
            )));
        }
        let model = request.model.unwrap_or(self.settings.default_model);
        let images = self.images()?;

        let title = match &request.source {
            ThumbnailSource::Title(title) => title.trim().to_string(),
            ThumbnailSource::Video(input) => {
                let id = resolve_video_id(input)
                    .ok_or_else(|| ThumbError::not_found(format!("no video id in {:?}", input)))?;
                self.fetch_video(&id).await?.title
            }
        };
        if title.is_empty() {
            return Err(ThumbError::invalid_input("title is empty"));
        }

        let (query, prompt_drafted) = self.thumbnail_query(&title, request.use_llm).await;
        info!("Generating {} thumbnail(s) with {} for {:?}", count, model, title);

        let batch = generate_with_fallback(
            images,
            &query,
            &self.settings.fallback_query,
            model,
            count,
        )
        .await?;

        Ok(ThumbnailOutcome {
            title,
            prompt_drafted,
            batch,
        })
    }
}

use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ThumbError, ThumbResult};

const PROVIDER: &str = "Freepik";

/// Image generation models offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ImageModel {
    /// Fast, lower fidelity
    ClassicFast,
    /// Slower, high quality
    Mystic,
}

impl ImageModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageModel::ClassicFast => "classic-fast",
            ImageModel::Mystic => "mystic",
        }
    }
}

impl fmt::Display for ImageModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub url: String,
}

/// Result of a thumbnail generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailBatch {
    /// Query the images were actually produced from
    pub query: String,
    /// Whether the generic fallback query had to be used
    pub used_fallback: bool,
    pub model: ImageModel,
    pub images: Vec<GeneratedImage>,
}

#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Produce up to `count` images for `query`. An empty list means the
    /// provider had nothing for this query.
    async fn generate(
        &self,
        query: &str,
        model: ImageModel,
        count: u32,
    ) -> ThumbResult<Vec<GeneratedImage>>;
}

/// Freepik resources client.
pub struct FreepikClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl FreepikClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> ThumbResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl ImageProvider for FreepikClient {
    async fn generate(
        &self,
        query: &str,
        model: ImageModel,
        count: u32,
    ) -> ThumbResult<Vec<GeneratedImage>> {
        debug!("Requesting {} {} image(s) for {:?}", count, model, query);

        let url = format!("{}/resources", self.base_url);
        let limit = count.to_string();
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[
                ("query", query),
                ("type", "photo"),
                ("model", model.as_str()),
                ("page", "1"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ThumbError::from_response(PROVIDER, response).await);
        }

        let data: serde_json::Value = response.json().await?;
        Ok(parse_images_response(&data, count))
    }
}

/// Pull image URLs out of a resources response. Items without a usable URL
/// are skipped.
pub fn parse_images_response(data: &serde_json::Value, count: u32) -> Vec<GeneratedImage> {
    let Some(items) = data["data"].as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            item["url"]
                .as_str()
                .or_else(|| item["image"]["source"]["url"].as_str())
                .filter(|u| !u.is_empty())
                .map(|u| GeneratedImage { url: u.to_string() })
        })
        .take(count as usize)
        .collect()
}

/// Generate images for `query`, retrying once with `fallback_query` when the
/// first attempt fails or comes back empty.
pub async fn generate_with_fallback(
    provider: &dyn ImageProvider,
    query: &str,
    fallback_query: &str,
    model: ImageModel,
    count: u32,
) -> ThumbResult<ThumbnailBatch> {
    match provider.generate(query, model, count).await {
        Ok(images) if !images.is_empty() => {
            info!("Generated {} image(s) with {}", images.len(), model);
            return Ok(ThumbnailBatch {
                query: query.to_string(),
                used_fallback: false,
                model,
                images,
            });
        }
        Ok(_) => warn!("No images for {:?}, retrying with fallback query", query),
        Err(e) => warn!("Image generation failed ({}), retrying with fallback query", e),
    }

    let images = provider.generate(fallback_query, model, count).await?;
    if images.is_empty() {
        return Err(ThumbError::NoImages {
            query: query.to_string(),
        });
    }

    info!("Generated {} image(s) from fallback query", images.len());
    Ok(ThumbnailBatch {
        query: fallback_query.to_string(),
        used_fallback: true,
        model,
        images,
    })
}

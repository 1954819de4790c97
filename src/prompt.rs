use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::{ThumbError, ThumbResult};

const PROVIDER: &str = "OpenAI";

const SYSTEM_PROMPT: &str = "You write prompts for image generation models. \
Given a YouTube video title, describe one eye-catching thumbnail image for it in a single \
paragraph: subject, composition, lighting, colors and mood. No text overlays, no quotes, \
no preamble.";

#[async_trait]
pub trait PromptProvider: Send + Sync {
    /// Turn a video title into an image-generation query. The returned text
    /// is used as-is.
    async fn draft_prompt(&self, title: &str) -> ThumbResult<String>;
}

/// OpenAI chat completions client.
pub struct OpenAiPromptClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiPromptClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> ThumbResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
        })
    }
}

#[async_trait]
impl PromptProvider for OpenAiPromptClient {
    async fn draft_prompt(&self, title: &str) -> ThumbResult<String> {
        debug!("Drafting image prompt with {} for {:?}", self.model, title);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": title}
                ],
                "temperature": self.temperature
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ThumbError::from_response(PROVIDER, response).await);
        }

        let result: serde_json::Value = response.json().await?;
        extract_completion(&result)
    }
}

/// First choice's message content, trimmed.
pub fn extract_completion(result: &serde_json::Value) -> ThumbResult<String> {
    let answer = result["choices"][0]["message"]["content"]
        .as_str()
        .map(str::trim)
        .unwrap_or_default();

    if answer.is_empty() {
        return Err(ThumbError::Provider {
            provider: PROVIDER,
            status: 200,
            message: "no completion in response".to_string(),
        });
    }

    debug!("OpenAI response: {} chars", answer.len());
    Ok(answer.to_string())
}

use thiserror::Error;

pub type ThumbResult<T> = Result<T, ThumbError>;

/// Errors surfaced by the providers and the pipeline.
///
/// Missing comparison data is never an error: it collapses into the neutral
/// outlier score instead.
#[derive(Debug, Error)]
pub enum ThumbError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} is not configured")]
    MissingApiKey(&'static str),

    #[error("{provider} returned status {status}: {message}")]
    Provider {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No images found for \"{query}\"! Try a different model or keyword.")]
    NoImages { query: String },
}

impl ThumbError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build a provider error from a non-success response, keeping a short
    /// slice of the body for the message.
    pub async fn from_response(provider: &'static str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message: String = body.trim().chars().take(300).collect();
        Self::Provider {
            provider,
            status,
            message: if message.is_empty() {
                "empty response body".to_string()
            } else {
                message
            },
        }
    }
}

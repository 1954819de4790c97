use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::images::ImageModel;

const PLACEHOLDER_KEY: &str = "YOUR_API_KEY_HERE";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub youtube_api_key: Option<String>,
    pub freepik_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub youtube: YoutubeConfig,
    #[serde(default)]
    pub images: ImagesConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeConfig {
    pub base_url: String,
    pub default_results: u32,
    pub max_results: u32,
    pub channel_sample_size: u32,
    pub outlier_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    pub base_url: String,
    pub default_model: ImageModel,
    pub default_count: u32,
    pub max_count: u32,
    pub fallback_query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub ttl_seconds: u64,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        YoutubeConfig {
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            default_results: 5,
            max_results: 15,
            channel_sample_size: 10,
            outlier_threshold: 2.0,
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        ImagesConfig {
            base_url: "https://api.freepik.com/v1".to_string(),
            default_model: ImageModel::ClassicFast,
            default_count: 3,
            max_count: 5,
            fallback_query: "YouTube thumbnail".to_string(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        PromptConfig {
            enabled: true,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            enabled: true,
            ttl_seconds: 600,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            youtube_api_key: None,
            freepik_api_key: None,
            openai_api_key: None,
            youtube: YoutubeConfig::default(),
            images: ImagesConfig::default(),
            prompt: PromptConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

/// Get the path to the config file (tries project root first, then ~/.config/thumbcraft/config.yaml)
pub fn get_config_path() -> PathBuf {
    let project_config = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.yaml");

    if project_config.exists() {
        return project_config;
    }

    if let Some(home_dir) = dirs::home_dir() {
        let home_config = home_dir.join(".config").join("thumbcraft").join("config.yaml");
        if home_config.exists() {
            return home_config;
        }
    }

    // Default to project root even if it doesn't exist
    project_config
}

impl Config {
    /// Load config from config.yaml in the project root or ~/.config/thumbcraft/config.yaml
    pub fn load() -> Result<Self> {
        let config_path = get_config_path();

        if config_path.exists() {
            info!("Loading config from {}", config_path.display());
            Self::load_from_file(&config_path)
        } else {
            warn!("No config.yaml found, using defaults");
            Ok(Config::default())
        }
    }

    /// Load config from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.youtube_api_key = clean_key(config.youtube_api_key.take(), "YouTube");
        config.freepik_api_key = clean_key(config.freepik_api_key.take(), "Freepik");
        config.openai_api_key = clean_key(config.openai_api_key.take(), "OpenAI");

        debug!(
            "Config loaded: channel_sample_size={}, cache={}, prompt={}",
            config.youtube.channel_sample_size, config.cache.enabled, config.prompt.enabled
        );

        Ok(config)
    }

    /// Get YouTube Data API key from config or environment variable
    pub fn get_youtube_api_key(&self) -> Option<String> {
        self.youtube_api_key
            .clone()
            .or_else(|| env_key("YOUTUBE_API_KEY"))
    }

    /// Get Freepik API key from config or environment variable
    pub fn get_freepik_api_key(&self) -> Option<String> {
        self.freepik_api_key
            .clone()
            .or_else(|| env_key("FREEPIK_API_KEY"))
    }

    /// Get OpenAI API key from config or environment variable
    pub fn get_openai_api_key(&self) -> Option<String> {
        self.openai_api_key
            .clone()
            .or_else(|| env_key("OPENAI_API_KEY"))
    }

    /// Copy of the config with every key removed, safe to hand to clients.
    pub fn redacted(&self) -> Config {
        Config {
            youtube_api_key: None,
            freepik_api_key: None,
            openai_api_key: None,
            ..self.clone()
        }
    }
}

fn clean_key(key: Option<String>, provider: &str) -> Option<String> {
    match key {
        Some(k) if k.trim().is_empty() || k == PLACEHOLDER_KEY => {
            warn!("{} API key not configured in config.yaml", provider);
            None
        }
        other => other,
    }
}

fn env_key(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty() && v != PLACEHOLDER_KEY)
}

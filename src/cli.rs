use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::images::ImageModel;

#[derive(Parser, Debug, Clone)]
#[command(name = "thumbcraft")]
#[command(version)]
#[command(about = "Score YouTube videos against their channel and generate thumbnail variations", long_about = None)]
pub struct Args {
    /// Path to config.yaml (defaults to the project root, then ~/.config/thumbcraft)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Search YouTube and rank the results by outlier score
    Search {
        /// Keyword to search for
        query: String,

        /// Number of results (1-15)
        #[arg(short = 'n', long, value_name = "N")]
        max_results: Option<u32>,

        /// Print JSON instead of a table
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Show metadata and the outlier score of one video
    Analyze {
        /// Video URL or bare 11-character id
        url: String,

        /// Print JSON instead of a summary
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Generate thumbnail variations from a video's title
    Thumbnails {
        /// Video URL or bare id (the title is looked up)
        #[arg(required_unless_present = "title", conflicts_with = "title")]
        url: Option<String>,

        /// Use this title instead of looking up a video
        #[arg(short, long, value_name = "TITLE")]
        title: Option<String>,

        /// Image model
        #[arg(short, long, value_enum)]
        model: Option<ImageModel>,

        /// Number of images (1-5)
        #[arg(short = 'n', long, value_name = "N")]
        count: Option<u32>,

        /// Use the title verbatim instead of drafting a prompt with the LLM
        #[arg(long, default_value = "false")]
        no_llm: bool,

        /// Print JSON instead of a list
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Print the video id found in a URL
    VideoId {
        /// URL to parse
        url: String,
    },

    /// Start REST API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

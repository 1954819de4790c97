use anyhow::{Context, Result};
use clap::Parser;
use thumbcraft::api;
use thumbcraft::cli::{Args, Command};
use thumbcraft::config::Config;
use thumbcraft::studio::{ScoredVideo, Studio, ThumbnailOutcome, ThumbnailRequest, ThumbnailSource};
use thumbcraft::video_id;
use tracing::Level;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .with_target(false)
        .init();

    let Some(command) = args.command.clone() else {
        eprintln!("\x1b[33m⚠️  No command specified.\x1b[0m\n");
        eprintln!("\x1b[36mℹ️  Thumbcraft ranks YouTube videos by outlier score and drafts thumbnails.\x1b[0m");
        eprintln!("\x1b[36m   Run '\x1b[1;32mthumbcraft --help\x1b[0;36m' to see all available commands.\x1b[0m\n");
        eprintln!("\x1b[1mQuick Start:\x1b[0m");
        eprintln!("  \x1b[32mthumbcraft search <keyword>\x1b[0m     Rank videos by outlier score");
        eprintln!("  \x1b[32mthumbcraft analyze <url>\x1b[0m        Score a single video");
        eprintln!("  \x1b[32mthumbcraft thumbnails <url>\x1b[0m     Generate thumbnail variations");
        eprintln!("  \x1b[32mthumbcraft serve\x1b[0m                Start REST API server\n");
        std::process::exit(1);
    };

    // Parsing a URL needs no configuration or network access.
    if let Command::VideoId { url } = &command {
        match video_id::extract_video_id(url) {
            Some(id) => println!("{}", id),
            None => {
                eprintln!("\x1b[31m✗\x1b[0m No video id found in {:?}", url);
                std::process::exit(2);
            }
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };

    match command {
        Command::Search {
            query,
            max_results,
            json,
        } => {
            let studio = Studio::from_config(&config)?;
            let results = studio
                .search(&query, max_results)
                .await
                .with_context(|| format!("Search for {:?} failed", query))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_search_results(&query, &results, config.youtube.outlier_threshold);
            }
        }
        Command::Analyze { url, json } => {
            let studio = Studio::from_config(&config)?;
            let scored = studio
                .analyze(&url)
                .await
                .with_context(|| format!("Could not analyze {}", url))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&scored)?);
            } else {
                print_analysis(&scored, config.youtube.outlier_threshold);
            }
        }
        Command::Thumbnails {
            url,
            title,
            model,
            count,
            no_llm,
            json,
        } => {
            let studio = Studio::from_config(&config)?;
            let source = match (url, title) {
                (Some(url), _) => ThumbnailSource::Video(url),
                (None, Some(title)) => ThumbnailSource::Title(title),
                (None, None) => anyhow::bail!("either a video URL or --title is required"),
            };
            let request = ThumbnailRequest {
                source,
                model,
                count,
                use_llm: !no_llm,
            };
            let outcome = studio
                .generate_thumbnails(&request)
                .await
                .context("Thumbnail generation failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_thumbnails(&outcome);
            }
        }
        Command::Serve { port, host } => {
            eprintln!("\x1b[35m🌐 Thumbcraft REST API Server\x1b[0m");
            eprintln!("\x1b[36m━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\x1b[0m\n");
            api::start_server(config, host, port).await?;
        }
        Command::VideoId { .. } => unreachable!("handled before loading config"),
    }

    Ok(())
}

fn score_color(scored: &ScoredVideo, threshold: f64) -> &'static str {
    if !scored.score().has_baseline() {
        "\x1b[90m"
    } else if scored.score().is_outlier(threshold) {
        "\x1b[1;32m"
    } else if scored.outlier_score < 1.0 {
        "\x1b[33m"
    } else {
        "\x1b[0m"
    }
}

fn print_search_results(query: &str, results: &[ScoredVideo], threshold: f64) {
    if results.is_empty() {
        eprintln!("\x1b[33m⚠️  No videos found for {:?}\x1b[0m", query);
        return;
    }

    println!("Showing results for: \x1b[1m{}\x1b[0m\n", query);
    for (index, scored) in results.iter().enumerate() {
        let color = score_color(scored, threshold);
        println!(
            "{:>2}. {}{:>6.2}x\x1b[0m  {}",
            index + 1,
            color,
            scored.outlier_score,
            scored.caption()
        );
        println!(
            "      \x1b[36m{}\x1b[0m · {}",
            scored.video.channel_title,
            scored.video.id.watch_url()
        );
    }
}

fn print_analysis(scored: &ScoredVideo, threshold: f64) {
    let video = &scored.video;
    let stats = &video.statistics;
    let count = |c: Option<u64>| c.map(|v| v.to_string()).unwrap_or_else(|| "unavailable".to_string());

    println!("\x1b[1m{}\x1b[0m", video.title);
    println!("  Channel:    {} ({})", video.channel_title, video.channel_id);
    if let Some(published) = video.published_at {
        println!("  Published:  {}", published.format("%Y-%m-%d %H:%M UTC"));
    }
    println!("  Views:      {}", count(stats.view_count));
    println!("  Likes:      {}", count(stats.like_count));
    println!("  Comments:   {}", count(stats.comment_count));
    if let Some(thumb) = video.thumbnails.best() {
        println!("  Thumbnail:  {}", thumb.url);
    }

    let color = score_color(scored, threshold);
    match scored.channel_average {
        Some(average) if scored.sample_size > 0 => println!(
            "  Outlier:    {}{:.2}x\x1b[0m (channel average {:.0} views over {} recent videos)",
            color, scored.outlier_score, average, scored.sample_size
        ),
        _ => println!(
            "  Outlier:    {}{:.2}x\x1b[0m (no channel data, neutral score)",
            color, scored.outlier_score
        ),
    }
}

fn print_thumbnails(outcome: &ThumbnailOutcome) {
    let batch = &outcome.batch;
    println!("Selected title: \x1b[1m{}\x1b[0m", outcome.title);
    if outcome.prompt_drafted && !batch.used_fallback {
        println!("Prompt:         {}", batch.query);
    }
    if batch.used_fallback {
        eprintln!(
            "\x1b[33m⚠️  No images for the title, used fallback query {:?}\x1b[0m",
            batch.query
        );
    }
    println!("Model:          {}\n", batch.model);
    for (i, image) in batch.images.iter().enumerate() {
        println!("  Generated Image {}: {}", i + 1, image.url);
    }
}

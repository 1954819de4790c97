mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common::{video, FakeImages, FakeVideos, ImageReply};
use std::sync::Arc;
use thumbcraft::api::{create_router, ApiState};
use thumbcraft::config::Config;
use thumbcraft::studio::{Studio, StudioSettings};
use tower::ServiceExt;

/// Helper to create test API state
fn create_test_state() -> ApiState {
    let videos = FakeVideos::new()
        .with_channel("UCsteady", &[("steady00001", Some(100)), ("steady00002", Some(300))])
        .with_video(video("hitvideo001", "UCsteady", Some(1000)))
        .with_video(video("normvideo01", "UCsteady", Some(200)))
        .with_search_results(&["normvideo01", "hitvideo001"]);
    let images = FakeImages::new().reply("Video hitvideo001", ImageReply::Images(vec!["https://img/1"]));

    let config = Config {
        youtube_api_key: Some("secret-youtube".to_string()),
        ..Default::default()
    };
    let studio = Studio::new(StudioSettings::from(&config))
        .with_videos(Arc::new(videos))
        .with_images(Arc::new(images));

    ApiState {
        config: Arc::new(config),
        studio: Arc::new(studio),
    }
}

async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let app = create_router(create_test_state());
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_config_hides_keys() {
    let (status, body) = send(get("/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["youtube_api_key"].is_null());
    assert_eq!(body["youtube"]["channel_sample_size"], 10);
    assert!(!body.to_string().contains("secret-youtube"));
}

#[tokio::test]
async fn test_video_id_endpoint() {
    let (status, body) = send(get("/video-id?url=https%3A%2F%2Fyoutu.be%2FdQw4w9WgXcQ")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["video_id"], "dQw4w9WgXcQ");
    assert_eq!(body["watch_url"], "https://www.youtube.com/watch?v=dQw4w9WgXcQ");

    let (status, body) = send(get("/video-id?url=not%20a%20url")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("Not found"));
}

#[tokio::test]
async fn test_search_endpoint() {
    let (status, body) = send(post_json(
        "/search",
        serde_json::json!({"query": "anything", "max_results": 5}),
    ))
    .await;

    assert_eq!(status, StatusCode::OK);
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["video"]["id"], "hitvideo001");
    assert_eq!(results[0]["outlier_score"], 5.0);
    assert_eq!(results[1]["outlier_score"], 1.0);
}

#[tokio::test]
async fn test_search_validation_error() {
    let (status, body) = send(post_json(
        "/search",
        serde_json::json!({"query": "anything", "max_results": 50}),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("between 1 and 15"));
}

#[tokio::test]
async fn test_analyze_endpoint() {
    let (status, body) = send(post_json(
        "/analyze",
        serde_json::json!({"url": "https://www.youtube.com/watch?v=hitvideo001"}),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outlier_score"], 5.0);
    assert_eq!(body["sample_size"], 2);
    assert_eq!(body["channel_average"], 200.0);
}

#[tokio::test]
async fn test_analyze_not_found() {
    let (status, _) = send(post_json("/analyze", serde_json::json!({"url": "nope"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_thumbnails_endpoint() {
    let (status, body) = send(post_json(
        "/thumbnails",
        serde_json::json!({"url": "hitvideo001", "model": "mystic", "count": 2, "use_llm": false}),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Video hitvideo001");
    assert_eq!(body["model"], "mystic");
    assert_eq!(body["used_fallback"], false);
    assert_eq!(body["images"][0]["url"], "https://img/1");
}

#[tokio::test]
async fn test_thumbnails_no_images() {
    let (status, body) = send(post_json(
        "/thumbnails",
        serde_json::json!({"title": "Something else", "use_llm": false}),
    ))
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("No images found"));
}

#[tokio::test]
async fn test_thumbnails_requires_source() {
    let (status, _) = send(post_json("/thumbnails", serde_json::json!({"count": 1}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_thumbnails_unknown_model_rejected() {
    let (status, _) = send(post_json(
        "/thumbnails",
        serde_json::json!({"title": "Cats", "model": "dalle"}),
    ))
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

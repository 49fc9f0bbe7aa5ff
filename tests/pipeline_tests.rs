//! Pipeline tests
//!
//! 端到端运行 PresentationService，外部服务全部替换为进程内实现。

mod common;

use std::io::Read;
use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{
    FakeChat, FakeImages, FakeStore, ScriptedImages, TINY_PNG, plan_json, service_with,
    test_config,
};
use slideforge::config::Profile;
use slideforge::errors::SlideforgeError;
use slideforge::services::DeckSource;
use tempfile::TempDir;

const SUMMARY: &str = "Revenue grew twelve percent while costs stayed flat across all regions.";

fn zip_entries(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    archive.file_names().map(String::from).collect()
}

fn media_count(bytes: &[u8]) -> usize {
    zip_entries(bytes)
        .iter()
        .filter(|e| e.starts_with("ppt/media/"))
        .count()
}

fn cached_files(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path().join("cache"))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_classic_generate_uploads_deck() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let images = FakeImages::ok();
    let store = FakeStore::ok();
    let service = service_with(&config, FakeChat::replying(plan_json(3)), images.clone(), store.clone());

    let deck = service.generate(3, SUMMARY).await.unwrap();

    assert_eq!(deck.source, DeckSource::Cloudinary);
    assert!(deck.url.starts_with("https://cdn.example.com/"));
    assert!(deck.url.contains("presentation_"));
    // 标题页 + 目录页 + 3 页内容
    assert_eq!(deck.slide_count, 5);
    assert_eq!(store.upload_count(), 1);
    // 只有偶数页配图
    assert_eq!(images.calls.load(Ordering::SeqCst), 1);

    let (public_id, size) = store.uploads.lock().unwrap()[0].clone();
    assert!(public_id.starts_with(&format!("{}/presentation_", config.cloudinary.folder)));
    assert_eq!(size, deck.bytes);
}

#[tokio::test]
async fn test_build_deck_produces_package() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Enhanced, &dir);
    let service = service_with(&config, FakeChat::replying(plan_json(4)), FakeImages::ok(), FakeStore::ok());

    let deck = service.build_deck(4, SUMMARY).await.unwrap();
    assert_eq!(deck.title, "Quarterly Review");
    assert_eq!(deck.slide_count, 6);

    let entries = zip_entries(&deck.bytes);
    assert!(entries.contains(&"[Content_Types].xml".to_string()));
    assert!(entries.contains(&"ppt/presentation.xml".to_string()));
    let slides = entries
        .iter()
        .filter(|e| e.starts_with("ppt/slides/slide") && e.ends_with(".xml"))
        .count();
    assert_eq!(slides, 6);
    // 第 2、4 页配图
    let media = entries.iter().filter(|e| e.starts_with("ppt/media/")).count();
    assert_eq!(media, 2);
}

#[tokio::test]
async fn test_title_slide_carries_plan_title() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let service = service_with(&config, FakeChat::replying(plan_json(1)), FakeImages::ok(), FakeStore::ok());

    let deck = service.build_deck(1, SUMMARY).await.unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(deck.bytes)).unwrap();
    let mut xml = String::new();
    archive
        .by_name("ppt/slides/slide1.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    assert!(xml.contains("Quarterly Review"));
}

#[tokio::test]
async fn test_fullscreen_rejects_short_plan() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Fullscreen, &dir);
    let store = FakeStore::ok();
    let service = service_with(&config, FakeChat::replying(plan_json(3)), FakeImages::ok(), store.clone());

    let err = service.generate(5, SUMMARY).await.unwrap_err();
    assert!(matches!(err, SlideforgeError::Llm(_)));
    assert!(err.message().contains("requested: 5, got: 3"));
    assert_eq!(store.upload_count(), 0);
}

#[tokio::test]
async fn test_classic_accepts_short_plan() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let service = service_with(&config, FakeChat::replying(plan_json(2)), FakeImages::ok(), FakeStore::ok());

    let deck = service.generate(5, SUMMARY).await.unwrap();
    assert_eq!(deck.slide_count, 4);
}

#[tokio::test]
async fn test_empty_plan_fails() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let service = service_with(&config, FakeChat::replying(plan_json(0)), FakeImages::ok(), FakeStore::ok());

    let err = service.generate(3, SUMMARY).await.unwrap_err();
    assert_eq!(err.message(), "Failed to generate slide plan");
}

#[tokio::test]
async fn test_unparseable_plan_fails() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let service = service_with(
        &config,
        FakeChat::replying("Sorry, I cannot help with that."),
        FakeImages::ok(),
        FakeStore::ok(),
    );

    let err = service.generate(3, SUMMARY).await.unwrap_err();
    assert!(matches!(err, SlideforgeError::PlanParse(_)));
}

#[tokio::test]
async fn test_chat_failure_propagates() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let service = service_with(&config, FakeChat::failing("quota exceeded"), FakeImages::ok(), FakeStore::ok());

    let err = service.generate(3, SUMMARY).await.unwrap_err();
    assert!(err.message().contains("quota exceeded"));
}

#[tokio::test]
async fn test_image_failures_do_not_abort_deck() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let service = service_with(&config, FakeChat::replying(plan_json(4)), FakeImages::broken(), FakeStore::ok());

    let deck = service.build_deck(4, SUMMARY).await.unwrap();
    let entries = zip_entries(&deck.bytes);
    assert!(!entries.iter().any(|e| e.starts_with("ppt/media/")));
    assert_eq!(deck.slide_count, 6);
}

#[tokio::test]
async fn test_images_served_from_cache_on_repeat() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let images = FakeImages::ok();
    let service = service_with(&config, FakeChat::replying(plan_json(2)), images.clone(), FakeStore::ok());

    service.build_deck(2, SUMMARY).await.unwrap();
    service.build_deck(2, SUMMARY).await.unwrap();
    assert_eq!(images.calls.load(Ordering::SeqCst), 1);

    let cached = std::fs::read_dir(dir.path().join("cache")).unwrap().count();
    assert_eq!(cached, 1);
}

#[tokio::test]
async fn test_upload_failure_falls_back_to_local_file() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(Profile::Fullscreen, &dir);
    let fallback = dir.path().join("decks");
    config.deck.local_fallback_dir = Some(fallback.to_string_lossy().into_owned());
    let service = service_with(&config, FakeChat::replying(plan_json(2)), FakeImages::ok(), FakeStore::broken());

    let deck = service.generate(2, SUMMARY).await.unwrap();
    assert_eq!(deck.source, DeckSource::Local);
    assert!(deck.url.starts_with("file://"));

    let path = deck.url.trim_start_matches("file://");
    let written = std::fs::read(path).unwrap();
    assert_eq!(written.len(), deck.bytes);
    assert!(path.ends_with(".pptx"));
}

#[tokio::test]
async fn test_upload_failure_without_fallback_is_error() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let service = service_with(&config, FakeChat::replying(plan_json(2)), FakeImages::ok(), FakeStore::broken());

    let err = service.generate(2, SUMMARY).await.unwrap_err();
    assert!(err.message().contains("upload rejected"));
}

#[tokio::test]
async fn test_non_image_payload_is_not_cached_or_embedded() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Fullscreen, &dir);
    let images = ScriptedImages::always(b"<html>Access denied</html>");
    let service = service_with(&config, FakeChat::replying(plan_json(2)), images.clone(), FakeStore::ok());

    let deck = service.build_deck(2, SUMMARY).await.unwrap();

    assert_eq!(images.calls.load(Ordering::SeqCst), 1);
    assert_eq!(media_count(&deck.bytes), 0);
    assert_eq!(cached_files(&dir), 0);
}

#[tokio::test]
async fn test_bad_payloads_count_as_failed_attempts() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(Profile::Classic, &dir);
    config.images.max_retries = 2;
    let images = ScriptedImages::new(
        vec![Ok(Vec::new()), Ok(b"<html>busy</html>".to_vec()), Ok(TINY_PNG.to_vec())],
        Duration::ZERO,
    );
    let service = service_with(&config, FakeChat::replying(plan_json(2)), images.clone(), FakeStore::ok());

    let deck = service.build_deck(2, SUMMARY).await.unwrap();

    assert_eq!(images.calls.load(Ordering::SeqCst), 3);
    assert_eq!(media_count(&deck.bytes), 1);
    assert_eq!(cached_files(&dir), 1);
}

#[tokio::test]
async fn test_retryable_backend_error_then_success() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(Profile::Classic, &dir);
    config.images.max_retries = 1;
    let images = ScriptedImages::new(
        vec![Err(SlideforgeError::image_generation("HTTP 500 from upstream"))],
        Duration::ZERO,
    );
    let service = service_with(&config, FakeChat::replying(plan_json(2)), images.clone(), FakeStore::ok());

    let deck = service.build_deck(2, SUMMARY).await.unwrap();
    assert_eq!(images.calls.load(Ordering::SeqCst), 2);
    assert_eq!(media_count(&deck.bytes), 1);
}

#[tokio::test]
async fn test_cleared_cache_dir_regenerates_images() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let images = FakeImages::ok();
    let service = service_with(&config, FakeChat::replying(plan_json(2)), images.clone(), FakeStore::ok());

    service.build_deck(2, SUMMARY).await.unwrap();
    std::fs::remove_dir_all(dir.path().join("cache")).unwrap();

    let deck = service.build_deck(2, SUMMARY).await.unwrap();
    assert_eq!(images.calls.load(Ordering::SeqCst), 2);
    assert_eq!(media_count(&deck.bytes), 1);
    assert_eq!(cached_files(&dir), 1);
}

#[tokio::test]
async fn test_image_requests_bounded_by_max_workers() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(Profile::Classic, &dir);
    config.images.max_workers = 2;
    let images = ScriptedImages::slow(Duration::from_millis(30));
    // 12 页内容，偶数页配图，共 6 个不同的提示词
    let service = service_with(&config, FakeChat::replying(plan_json(12)), images.clone(), FakeStore::ok());

    let deck = service.build_deck(12, SUMMARY).await.unwrap();

    assert_eq!(images.calls.load(Ordering::SeqCst), 6);
    let peak = images.peak.load(Ordering::SeqCst);
    assert!(peak >= 1 && peak <= 2, "peak concurrency was {}", peak);
    assert_eq!(media_count(&deck.bytes), 6);
}

#[tokio::test]
async fn test_identical_prompts_share_one_request() {
    let dir = TempDir::new().unwrap();
    let config = test_config(Profile::Classic, &dir);
    let plan = serde_json::json!({
        "presentation_meta": {"title": "Shared artwork"},
        "content_slides": (1..=4).map(|n| serde_json::json!({
            "slide_number": n,
            "title": format!("Topic {}", n),
            "content_points": ["point"],
            "image_concept": "City skyline at dusk"
        })).collect::<Vec<_>>()
    })
    .to_string();
    let images = ScriptedImages::slow(Duration::from_millis(30));
    let service = service_with(&config, FakeChat::replying(plan), images.clone(), FakeStore::ok());

    let deck = service.build_deck(4, SUMMARY).await.unwrap();

    assert_eq!(images.calls.load(Ordering::SeqCst), 1);
    assert_eq!(cached_files(&dir), 1);
    // 两张图片页各自嵌入一份
    assert_eq!(media_count(&deck.bytes), 2);
}

#[tokio::test]
async fn test_transient_upload_failure_is_retried() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(Profile::Classic, &dir);
    config.images.max_retries = 1;
    let store = FakeStore::flaky(1);
    let service = service_with(&config, FakeChat::replying(plan_json(2)), FakeImages::ok(), store.clone());

    let deck = service.generate(2, SUMMARY).await.unwrap();

    assert_eq!(deck.source, DeckSource::Cloudinary);
    assert_eq!(store.attempts.load(Ordering::SeqCst), 2);
    assert_eq!(store.upload_count(), 1);
}

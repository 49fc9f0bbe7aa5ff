//! 集成测试共用的进程内协作方
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;

use slideforge::clients::{ChatBackend, ImageBackend, ObjectStore};
use slideforge::config::{Profile, StaticConfig};
use slideforge::errors::{Result, SlideforgeError};
use slideforge::services::PresentationService;

/// 最小的 PNG 文件头 + IHDR，足以被识别为 png
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89,
];

/// 生成 `count` 页内容的大纲 JSON
pub fn plan_json(count: usize) -> String {
    let slides: Vec<serde_json::Value> = (1..=count)
        .map(|n| {
            serde_json::json!({
                "slide_number": n,
                "section": "Overview",
                "title": format!("Topic {}", n),
                "content_points": [
                    format!("First point about topic {}", n),
                    "Second point with more words to wrap across the text box",
                ],
                "slide_type": "text_heavy",
                "has_image": false,
                "image_concept": null
            })
        })
        .collect();
    serde_json::json!({
        "presentation_meta": {
            "title": "Quarterly Review",
            "subtitle": "Results and outlook",
            "total_content_slides": count,
            "estimated_duration": "10 minutes"
        },
        "theme": {"name": "corporate", "style": "modern", "palette_index": 0, "mood": "calm"},
        "table_of_contents": [
            {"section_number": 1, "section_title": "Overview", "slides": (1..=count).collect::<Vec<_>>()}
        ],
        "content_slides": slides
    })
    .to_string()
}

/// 固定返回一段文本的对话后端
pub struct FakeChat {
    reply: Result<String>,
    pub calls: AtomicUsize,
}

impl FakeChat {
    pub fn replying(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.into()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(SlideforgeError::llm(message)),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ChatBackend for FakeChat {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone()
    }

    fn name(&self) -> &'static str {
        "fake-chat"
    }
}

/// 返回固定 PNG 的图像后端，可设置为始终失败
pub struct FakeImages {
    fail: bool,
    pub calls: AtomicUsize,
}

impl FakeImages {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ImageBackend for FakeImages {
    async fn generate(&self, _prompt: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(SlideforgeError::validation("content policy violation"))
        } else {
            Ok(TINY_PNG.to_vec())
        }
    }

    fn name(&self) -> &'static str {
        "fake-images"
    }
}

/// 按脚本依次返回结果的图像后端，脚本用完后返回 TINY_PNG
///
/// 每次调用先等待 `delay`，同时记录并发峰值
pub struct ScriptedImages {
    script: Mutex<VecDeque<Result<Vec<u8>>>>,
    delay: Duration,
    pub calls: AtomicUsize,
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
}

impl ScriptedImages {
    pub fn new(script: Vec<Result<Vec<u8>>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            delay,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }

    /// 始终返回同一段内容
    pub fn always(payload: &[u8]) -> Arc<Self> {
        Self::new(vec![Ok(payload.to_vec()); 64], Duration::ZERO)
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Self::new(Vec::new(), delay)
    }
}

#[async_trait]
impl ImageBackend for ScriptedImages {
    async fn generate(&self, _prompt: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(TINY_PNG.to_vec()))
    }

    fn name(&self) -> &'static str {
        "scripted-images"
    }
}

/// 记录上传内容的对象存储
#[derive(Default)]
pub struct FakeStore {
    fail: bool,
    /// 前 N 次返回可重试的上传错误
    transient_failures: AtomicUsize,
    pub attempts: AtomicUsize,
    pub uploads: Mutex<Vec<(String, usize)>>,
}

impl FakeStore {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn broken() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn flaky(failures: usize) -> Arc<Self> {
        Arc::new(Self {
            transient_failures: AtomicUsize::new(failures),
            ..Self::default()
        })
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn upload(&self, public_id: &str, bytes: &[u8]) -> Result<String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let transient = self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if transient {
            return Err(SlideforgeError::upload("Cloudinary upload failed with HTTP 503"));
        }
        if self.fail {
            // 非重试类错误，测试不必等待退避
            return Err(SlideforgeError::validation("upload rejected"));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((public_id.to_string(), bytes.len()));
        Ok(format!("https://cdn.example.com/raw/upload/{}.pptx", public_id))
    }

    fn name(&self) -> &'static str {
        "fake-store"
    }
}

/// 指向临时缓存目录、无重试等待的配置
pub fn test_config(profile: Profile, dir: &TempDir) -> StaticConfig {
    let mut config = StaticConfig::default();
    config.deck.profile = profile;
    config.openai.api_key = "sk-test".into();
    config.images.cache_dir = dir.path().join("cache").to_string_lossy().into_owned();
    config.images.max_retries = 0;
    config.images.max_workers = 4;
    config.images.retry_base_delay_ms = 1;
    config.images.retry_max_delay_ms = 1;
    config
}

pub fn service_with(
    config: &StaticConfig,
    chat: Arc<FakeChat>,
    images: Arc<dyn ImageBackend>,
    store: Arc<dyn ObjectStore>,
) -> PresentationService {
    PresentationService::new(config, chat, images, store).with_palette(0)
}

//! 配图生成服务
//!
//! - 磁盘缓存：`<sha256(prompt)>.png`，命中时不发请求
//! - Singleflight：并发的相同提示词只请求一次（moka `try_get_with`，失败不缓存）；
//!   请求结束即移除条目，之后以磁盘为准
//! - 返回内容必须是 PNG、JPEG 或 GIF，否则算作一次失败的尝试
//! - 有界并发：同时最多 `max_workers` 个请求
//! - 单张失败只记录日志，不影响整份演示文稿

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream;
use moka::future::Cache;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::retry::{RetryConfig, with_retry};
use crate::clients::ImageBackend;
use crate::config::{ImageConfig, Profile};
use crate::deck::pptx::sniff_image;
use crate::errors::{Result, SlideforgeError};
use crate::planner::ContentSlide;

/// 同时进行中的不同提示词上限
const INFLIGHT_MAX_CAPACITY: u64 = 1_000;

const PROFESSIONAL_STYLE: &str = "professional corporate design, clean minimal aesthetic, \
high-end business presentation style, sophisticated color scheme, premium quality, \
modern flat design, no text overlays, suitable for executive presentation, clean background, \
professional photography style, corporate branding appropriate, business-focused imagery";

const CORPORATE_STYLE: &str = "professional corporate style";

/// 提示词风格后缀
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// 完整的商务风格描述
    Professional,
    /// 简短后缀
    Corporate,
}

impl From<Profile> for PromptStyle {
    fn from(profile: Profile) -> Self {
        match profile {
            Profile::Fullscreen => Self::Corporate,
            Profile::Classic | Profile::Enhanced => Self::Professional,
        }
    }
}

/// 为提示词追加风格后缀
pub fn enhance_prompt(prompt: &str, style: PromptStyle) -> String {
    match style {
        PromptStyle::Professional => format!("{}, {}", prompt, PROFESSIONAL_STYLE),
        PromptStyle::Corporate => format!("{}, {}", prompt, CORPORATE_STYLE),
    }
}

/// 缓存文件名：原始提示词的 SHA-256（小写十六进制）
pub fn cache_key(prompt: &str) -> String {
    hex::encode(Sha256::digest(prompt.as_bytes()))
}

/// 配图提示词：优先使用 image_concept
pub fn slide_prompt(slide: &ContentSlide) -> String {
    match slide.image_concept.as_deref().map(str::trim) {
        Some(concept) if !concept.is_empty() => concept.to_string(),
        _ => {
            let title = if slide.title.trim().is_empty() {
                "slide"
            } else {
                slide.title.as_str()
            };
            format!("Professional illustration for {}", title)
        }
    }
}

pub struct ImageGenerator {
    backend: Arc<dyn ImageBackend>,
    cache_dir: PathBuf,
    max_workers: usize,
    retry: RetryConfig,
    style: PromptStyle,
    /// 进行中的 prompt → 缓存文件路径
    inflight: Cache<String, PathBuf>,
}

impl ImageGenerator {
    pub fn new(backend: Arc<dyn ImageBackend>, config: &ImageConfig, style: PromptStyle) -> Self {
        let inflight = Cache::builder().max_capacity(INFLIGHT_MAX_CAPACITY).build();

        Self {
            backend,
            cache_dir: PathBuf::from(&config.cache_dir),
            max_workers: config.max_workers.max(1),
            retry: RetryConfig::from(config),
            style,
            inflight,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn cache_path(&self, prompt: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.png", cache_key(prompt)))
    }

    /// 创建缓存目录
    pub async fn ensure_cache_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.cache_dir).await.map_err(|e| {
            SlideforgeError::file_operation(format!(
                "Failed to create image cache dir {}: {}",
                self.cache_dir.display(),
                e
            ))
        })
    }

    /// 生成单张图片，返回缓存文件路径
    pub async fn generate_image(&self, prompt: &str) -> Result<PathBuf> {
        let key = prompt.to_string();
        let outcome = self
            .inflight
            .try_get_with(key.clone(), self.fetch_or_generate(prompt))
            .await
            .map_err(|e| (*e).clone());
        // 只合并并发请求；缓存目录被清理后下一次会重新生成
        self.inflight.invalidate(&key).await;
        outcome
    }

    async fn fetch_or_generate(&self, prompt: &str) -> Result<PathBuf> {
        let path = self.cache_path(prompt);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!("Using cached image {}", path.display());
            return Ok(path);
        }

        let enhanced = enhance_prompt(prompt, self.style);
        let backend = self.backend.clone();
        let bytes = with_retry("image generation", self.retry, || {
            let backend = backend.clone();
            let enhanced = enhanced.clone();
            async move {
                let bytes = backend.generate(&enhanced).await?;
                if bytes.is_empty() {
                    return Err(SlideforgeError::image_generation(
                        "Image backend returned no data",
                    ));
                }
                if sniff_image(&bytes).is_none() {
                    return Err(SlideforgeError::image_generation(format!(
                        "Image backend returned {} bytes that are not PNG, JPEG or GIF",
                        bytes.len()
                    )));
                }
                Ok(bytes)
            }
        })
        .await?;

        self.ensure_cache_dir().await?;
        write_once(&path, &bytes).await?;
        debug!("Cached {} byte image at {}", bytes.len(), path.display());
        Ok(path)
    }

    /// 为需要配图的页面生成图片，返回 slide_number → 路径
    ///
    /// 失败的页面不出现在结果中
    pub async fn generate_for_slides(&self, slides: &[ContentSlide]) -> HashMap<u32, PathBuf> {
        let jobs: Vec<(u32, String)> = slides
            .iter()
            .filter(|s| s.has_image)
            .map(|s| (s.number(), slide_prompt(s)))
            .collect();
        let total = jobs.len();
        if total == 0 {
            return HashMap::new();
        }

        info!(
            "Generating {} images with up to {} concurrent requests",
            total, self.max_workers
        );

        let mut results = stream::iter(jobs)
            .map(|(number, prompt)| async move {
                let outcome = self.generate_image(&prompt).await;
                (number, prompt, outcome)
            })
            .buffer_unordered(self.max_workers);

        let mut paths = HashMap::with_capacity(total);
        let mut completed = 0usize;
        while let Some((number, prompt, outcome)) = results.next().await {
            completed += 1;
            match outcome {
                Ok(path) => {
                    paths.insert(number, path);
                }
                Err(e) => {
                    warn!(
                        "Image for slide {} failed ({}): {}",
                        number,
                        preview(&prompt),
                        e
                    );
                }
            }
            info!(completed, total, "Image progress");
        }

        info!("Generated {}/{} images", paths.len(), total);
        paths
    }
}

/// 先写临时文件再改名，其他进程不会读到半个文件
async fn write_once(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension(format!("png.{}.tmp", uuid::Uuid::new_v4().simple()));
    tokio::fs::write(&tmp, bytes).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(SlideforgeError::file_operation(format!(
            "Failed to store cached image {}: {}",
            path.display(),
            e
        )));
    }
    Ok(())
}

fn preview(prompt: &str) -> String {
    let head: String = prompt.chars().take(50).collect();
    if head.len() < prompt.len() {
        format!("{}...", head)
    } else {
        head
    }
}

//! 演示文稿生成流水线
//!
//! 大纲 → 配色 → 配图 → 组装 → 上传（失败时可回退到本地文件）

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use super::image_generator::{ImageGenerator, PromptStyle};
use super::retry::{RetryConfig, with_retry};
use crate::clients::cloudinary::public_id_in;
use crate::clients::{ChatBackend, CloudinaryClient, ImageBackend, ObjectStore, OpenAiClient};
use crate::config::{Profile, StaticConfig};
use crate::deck::{DeckBuilder, PALETTES};
use crate::errors::{Result, SlideforgeError};
use crate::planner::{DeckPlan, SlidePlanner};

/// 小于该字节数的成品视为空文件
pub const MIN_DECK_BYTES: usize = 1024;

/// 成品存放位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeckSource {
    Cloudinary,
    Local,
}

impl DeckSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeckSource::Cloudinary => "cloudinary",
            DeckSource::Local => "local",
        }
    }
}

/// 已组装但尚未上传的演示文稿
#[derive(Debug, Clone)]
pub struct BuiltDeck {
    pub bytes: Vec<u8>,
    /// 含标题页与目录页
    pub slide_count: usize,
    pub title: String,
}

/// 一次生成的结果
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDeck {
    pub url: String,
    pub source: DeckSource,
    pub bytes: usize,
    pub slide_count: usize,
}

pub struct PresentationService {
    profile: Profile,
    planner: SlidePlanner,
    images: ImageGenerator,
    builder: Arc<DeckBuilder>,
    store: Arc<dyn ObjectStore>,
    upload_folder: String,
    upload_retry: RetryConfig,
    local_fallback_dir: Option<PathBuf>,
    palette_override: Option<usize>,
}

impl PresentationService {
    /// 使用注入的后端构建
    pub fn new(
        config: &StaticConfig,
        chat: Arc<dyn ChatBackend>,
        image_backend: Arc<dyn ImageBackend>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        let profile = config.deck.profile;
        Self {
            profile,
            planner: SlidePlanner::new(chat),
            images: ImageGenerator::new(image_backend, &config.images, PromptStyle::from(profile)),
            builder: Arc::new(DeckBuilder::new(profile)),
            store,
            upload_folder: config.cloudinary.folder.clone(),
            upload_retry: RetryConfig::from(&config.images),
            local_fallback_dir: config.deck.local_fallback_dir.as_ref().map(PathBuf::from),
            palette_override: None,
        }
    }

    /// 使用 OpenAI 与 Cloudinary 客户端构建
    pub fn from_config(config: &StaticConfig) -> Self {
        let openai = Arc::new(OpenAiClient::new(&config.openai));
        let cloudinary = Arc::new(CloudinaryClient::new(&config.cloudinary));
        Self::new(config, openai.clone(), openai, cloudinary)
    }

    /// 固定配色（默认每份随机）
    pub fn with_palette(mut self, index: usize) -> Self {
        self.palette_override = Some(index);
        self
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn image_generator(&self) -> &ImageGenerator {
        &self.images
    }

    /// 完整流水线：生成并上传
    pub async fn generate(&self, slide_count: u32, summary: &str) -> Result<GeneratedDeck> {
        let deck = self.build_deck(slide_count, summary).await?;
        let name = format!("presentation_{}", chrono::Utc::now().timestamp());
        let public_id = public_id_in(&self.upload_folder, &name);
        let size = deck.bytes.len();

        let bytes = Arc::new(deck.bytes);
        let store = self.store.clone();
        let uploaded = with_retry("deck upload", self.upload_retry, || {
            let store = store.clone();
            let bytes = bytes.clone();
            let public_id = public_id.clone();
            async move { store.upload(&public_id, &bytes).await }
        })
        .await;

        match uploaded {
            Ok(url) => {
                info!("Uploaded {} ({} bytes) to {}", public_id, size, self.store.name());
                Ok(GeneratedDeck {
                    url,
                    source: DeckSource::Cloudinary,
                    bytes: size,
                    slide_count: deck.slide_count,
                })
            }
            Err(e) => match &self.local_fallback_dir {
                Some(dir) => {
                    warn!("Upload failed, keeping deck locally: {}", e);
                    let path = write_deck(dir, &format!("{}.pptx", name), &bytes).await?;
                    Ok(GeneratedDeck {
                        url: file_url(&path),
                        source: DeckSource::Local,
                        bytes: size,
                        slide_count: deck.slide_count,
                    })
                }
                None => {
                    error!("Upload of {} failed: {}", public_id, e);
                    Err(e)
                }
            },
        }
    }

    /// 大纲、配图与组装，不上传
    pub async fn build_deck(&self, slide_count: u32, summary: &str) -> Result<BuiltDeck> {
        let plan = self.planner.plan(summary, slide_count).await?;
        self.check_plan(&plan, slide_count)?;

        let palette_index = self
            .palette_override
            .unwrap_or_else(|| rand::random_range(0..PALETTES.len()));
        info!(
            "Using palette '{}' for '{}'",
            PALETTES[palette_index % PALETTES.len()].name,
            plan.meta.title
        );

        let images = self.images.generate_for_slides(&plan.content_slides).await;
        let bytes = self.assemble(plan.clone(), images, palette_index).await?;

        if self.profile.strict_slide_count() && bytes.len() < MIN_DECK_BYTES {
            return Err(SlideforgeError::deck_build(
                "Generated presentation is too small (likely empty)",
            ));
        }

        Ok(BuiltDeck {
            bytes,
            slide_count: plan.content_slides.len() + 2,
            title: plan.meta.title,
        })
    }

    fn check_plan(&self, plan: &DeckPlan, requested: u32) -> Result<()> {
        let got = plan.content_slides.len();
        if self.profile.strict_slide_count() && got < requested as usize {
            return Err(SlideforgeError::llm(format!(
                "Failed to generate adequate slides (requested: {}, got: {})",
                requested, got
            )));
        }
        if plan.is_empty() {
            return Err(SlideforgeError::llm("Failed to generate slide plan"));
        }
        if got != requested as usize {
            warn!("Requested {} content slides, model returned {}", requested, got);
        }
        Ok(())
    }

    /// 组装涉及读文件与压缩，放到阻塞线程池
    async fn assemble(
        &self,
        plan: DeckPlan,
        images: HashMap<u32, PathBuf>,
        palette_index: usize,
    ) -> Result<Vec<u8>> {
        let builder = self.builder.clone();
        tokio::task::spawn_blocking(move || builder.build(&plan, &images, palette_index))
            .await
            .map_err(|e| SlideforgeError::deck_build(format!("Deck assembly task failed: {}", e)))?
    }
}

/// 写入本地目录，返回绝对路径
pub async fn write_deck(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        SlideforgeError::file_operation(format!("Failed to create {}: {}", dir.display(), e))
    })?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes).await.map_err(|e| {
        SlideforgeError::file_operation(format!("Failed to write {}: {}", path.display(), e))
    })?;
    Ok(tokio::fs::canonicalize(&path).await.unwrap_or(path))
}

pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

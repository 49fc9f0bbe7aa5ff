//! 幻灯片大纲规划
//!
//! 提示词 → `ChatBackend` → 清理代码块 → 反序列化 → 归一化

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clients::ChatBackend;
use crate::errors::{Result, SlideforgeError};

pub mod model;
pub mod prompt;

pub use model::{ContentSlide, DeckPlan, PresentationMeta, SlideType, ThemeHint, TocSection};
pub use prompt::{build_prompt, clean_code_fence};

/// 解析模型输出
pub fn parse_plan(raw: &str) -> Result<DeckPlan> {
    let cleaned = clean_code_fence(raw);
    serde_json::from_str(cleaned).map_err(|e| {
        SlideforgeError::plan_parse(format!("Slide plan is not valid JSON: {}", e))
    })
}

/// 归一化：补全页码、按页码奇偶决定是否配图、补全配图描述
pub fn normalize(mut plan: DeckPlan) -> DeckPlan {
    for (index, slide) in plan.content_slides.iter_mut().enumerate() {
        let number = *slide.slide_number.get_or_insert(index as u32 + 1);
        slide.has_image = number % 2 == 0;
        slide.slide_type = if slide.has_image {
            SlideType::ImageSlide
        } else {
            SlideType::TextHeavy
        };

        let missing_concept = slide
            .image_concept
            .as_deref()
            .is_none_or(|c| c.trim().is_empty());
        if slide.has_image && missing_concept {
            slide.image_concept = Some(format!(
                "Professional illustration representing {}, clean corporate style, modern design",
                display_title(&slide.title)
            ));
        }
    }
    plan
}

fn display_title(title: &str) -> &str {
    if title.trim().is_empty() {
        "slide content"
    } else {
        title
    }
}

/// 大纲规划器
pub struct SlidePlanner {
    chat: Arc<dyn ChatBackend>,
}

impl SlidePlanner {
    pub fn new(chat: Arc<dyn ChatBackend>) -> Self {
        Self { chat }
    }

    /// 请求模型生成 `slide_count` 页内容的大纲
    pub async fn plan(&self, summary: &str, slide_count: u32) -> Result<DeckPlan> {
        let prompt = build_prompt(summary, slide_count);
        debug!(
            "Requesting slide plan from {} ({} prompt chars)",
            self.chat.name(),
            prompt.len()
        );

        let raw = self.chat.complete(&prompt).await?;
        let plan = parse_plan(&raw).inspect_err(|e| {
            warn!("Discarding unparseable slide plan: {}", e);
        })?;
        let plan = normalize(plan);

        info!(
            "Slide plan ready: '{}' with {} content slides ({} sections)",
            plan.meta.title,
            plan.content_slides.len(),
            plan.table_of_contents.len()
        );
        Ok(plan)
    }
}

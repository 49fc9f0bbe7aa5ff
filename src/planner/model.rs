//! 大纲数据模型
//!
//! 模型返回的 JSON 并不总是完整，所有字段都可缺省；
//! 数字字段同时接受数字与数字字符串。

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationMeta {
    pub title: String,
    pub subtitle: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub total_content_slides: Option<u32>,
    pub estimated_duration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeHint {
    pub name: String,
    pub style: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub palette_index: Option<u32>,
    pub mood: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocSection {
    #[serde(deserialize_with = "lenient_u32")]
    pub section_number: Option<u32>,
    pub section_title: String,
    #[serde(deserialize_with = "lenient_u32_list")]
    pub slides: Vec<u32>,
}

impl TocSection {
    /// "Slides a-b" 或 "Slide n"；没有页码时为空
    pub fn slide_range_label(&self) -> String {
        match self.slides.as_slice() {
            [] => String::new(),
            [only] => format!("Slide {}", only),
            [first, .., last] => format!("Slides {}-{}", first, last),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideType {
    #[default]
    TextHeavy,
    ImageSlide,
    /// 模型偶尔返回的其他取值，归一化时会被覆盖
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSlide {
    #[serde(deserialize_with = "lenient_u32")]
    pub slide_number: Option<u32>,
    pub section: String,
    pub title: String,
    pub content_points: Vec<String>,
    pub slide_type: SlideType,
    pub has_image: bool,
    pub image_concept: Option<String>,
}

impl ContentSlide {
    /// 归一化之后一定有值
    pub fn number(&self) -> u32 {
        self.slide_number.unwrap_or(0)
    }
}

/// 完整的大纲
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckPlan {
    #[serde(rename = "presentation_meta")]
    pub meta: PresentationMeta,
    pub theme: ThemeHint,
    pub table_of_contents: Vec<TocSection>,
    pub content_slides: Vec<ContentSlide>,
}

impl DeckPlan {
    pub fn is_empty(&self) -> bool {
        self.content_slides.is_empty()
    }
}

fn value_as_u32(value: &serde_json::Value) -> Option<u32> {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_u32))
}

fn lenient_u32_list<'de, D>(deserializer: D) -> Result<Vec<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items.iter().filter_map(value_as_u32).collect(),
        Some(other) => value_as_u32(&other).into_iter().collect(),
        None => Vec::new(),
    })
}

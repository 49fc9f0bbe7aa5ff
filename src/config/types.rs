//! 配置类型定义模块
//!
//! 定义部署 profile：同一条生成流水线的几种部署变体，
//! 区别在于 API Key 校验、画布尺寸和少量版式差异。

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumMessage, EnumString};

use crate::deck::pptx::units::EMU_PER_INCH;

/// 部署 profile
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    EnumIter,
    AsRefStr,
    Display,
    EnumString,
    EnumMessage,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Profile {
    /// 4:3 画布，无 API Key，分片上传
    #[default]
    #[strum(message = "4:3 canvas, open endpoint, chunked upload")]
    Classic,
    /// 4:3 画布，带装饰元素和动态标题字号
    #[strum(message = "4:3 canvas with decorative elements")]
    Enhanced,
    /// 16:9 画布，强制 API Key，严格校验并支持本地回退
    #[strum(message = "16:9 canvas, API key required, strict validation")]
    Fullscreen,
}

impl Profile {
    /// 画布尺寸（EMU）
    pub fn canvas(&self) -> (i64, i64) {
        match self {
            Self::Classic | Self::Enhanced => {
                (10 * EMU_PER_INCH, 7 * EMU_PER_INCH + EMU_PER_INCH / 2)
            }
            // 10" x 5.625"
            Self::Fullscreen => (10 * EMU_PER_INCH, 5_143_500),
        }
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Fullscreen)
    }

    /// 是否使用装饰性版式（动态标题、装饰条、母版背景）
    pub fn decorated(&self) -> bool {
        !matches!(self, Self::Classic)
    }

    /// 大纲返回的页数少于请求时是否视为失败
    pub fn strict_slide_count(&self) -> bool {
        matches!(self, Self::Fullscreen)
    }
}

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

//! HTTP 请求与响应结构

use serde::{Deserialize, Serialize};

use crate::services::{DeckSource, GeneratedDeck};

/// `POST /generate-ppt` 的请求体
///
/// 字段保留原始 JSON 值，类型检查在 handler 中完成，
/// 以便返回与字段对应的错误信息。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub slide_count: Option<serde_json::Value>,
    #[serde(default)]
    pub summary: Option<serde_json::Value>,
}

/// 校验通过的请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidGenerateRequest {
    pub slide_count: u32,
    pub summary: String,
}

/// 生成成功的响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub status: String,
    pub message: String,
    pub presentation_url: String,
    pub url: String,
    pub source: String,
    pub timestamp: String,
    pub slide_count: u32,
}

impl GenerateResponse {
    pub fn from_deck(deck: &GeneratedDeck, requested: u32) -> Self {
        Self {
            status: "success".to_string(),
            message: "Presentation generated successfully".to_string(),
            presentation_url: deck.url.clone(),
            url: deck.url.clone(),
            source: deck.source.as_str().to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            slide_count: requested,
        }
    }

    pub fn is_local(&self) -> bool {
        self.source == DeckSource::Local.as_str()
    }
}

/// 错误响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self::with_status("error", error)
    }

    pub fn with_status(status: &str, error: impl Into<String>) -> Self {
        Self {
            status: status.to_string(),
            error: error.into(),
            details: None,
            trace_id: None,
        }
    }

    /// 请求体本身有问题
    pub fn invalid_request(error: impl Into<String>) -> Self {
        Self::with_status("invalid_request", error)
    }

    /// 某个字段取值不合法
    pub fn invalid_parameter(error: impl Into<String>) -> Self {
        Self::with_status("invalid_parameter", error)
    }

    pub fn generation_failed(details: impl Into<String>, trace_id: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: "Presentation generation failed".to_string(),
            details: Some(details.into()),
            trace_id: Some(trace_id.into()),
        }
    }
}

/// `GET /health` 响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// 运行秒数
    pub uptime: u64,
    pub profile: String,
    pub timestamp: String,
}

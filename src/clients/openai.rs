//! OpenAI 客户端
//!
//! - `/chat/completions`：生成幻灯片大纲
//! - `/images/generations`：生成配图，兼容 `url` 与 `b64_json` 两种返回

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use ureq::Agent;

use super::http::{build_agent, is_success, read_bytes, read_text, run_blocking, truncate_for_log};
use super::{ChatBackend, ImageBackend};
use crate::config::OpenAiConfig;
use crate::errors::{Result, SlideforgeError};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<&'a str>,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    b64_json: Option<String>,
}

/// 图像接口返回的数据形式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePayload {
    Url(String),
    Base64(String),
}

/// 解析对话补全响应，取第一个 choice 的文本
pub fn parse_chat_response(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| SlideforgeError::llm(format!("Malformed chat completion response: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| SlideforgeError::llm("Chat completion returned no content"))
}

/// 解析图像生成响应
pub fn parse_image_response(body: &str) -> Result<ImagePayload> {
    let response: ImageResponse = serde_json::from_str(body).map_err(|e| {
        SlideforgeError::image_generation(format!("Malformed image response: {}", e))
    })?;

    let datum = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| SlideforgeError::image_generation("Image response contained no data"))?;

    match (datum.url, datum.b64_json) {
        (Some(url), _) if !url.is_empty() => Ok(ImagePayload::Url(url)),
        (_, Some(b64)) if !b64.is_empty() => Ok(ImagePayload::Base64(b64)),
        _ => Err(SlideforgeError::image_generation(
            "Image response had neither url nor b64_json",
        )),
    }
}

/// 从 OpenAI 错误响应中提取 `error.message`
fn upstream_error(status: u16, body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| truncate_for_log(body, 300));
    format!("HTTP {}: {}", status, message)
}

/// OpenAI 客户端，同时实现大纲与配图两个接口
#[derive(Clone)]
pub struct OpenAiClient {
    agent: Agent,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Self {
        Self {
            agent: build_agent(config.timeout_secs),
            config: config.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn complete_sync(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config.chat_model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        let response = self
            .agent
            .post(&self.endpoint("chat/completions"))
            .header("Authorization", &format!("Bearer {}", self.config.api_key))
            .send_json(&request)?;
        let (status, body) = read_text(response)?;

        if !is_success(status) {
            return Err(SlideforgeError::llm(upstream_error(status, &body)));
        }
        trace!("Chat completion returned {} bytes", body.len());
        parse_chat_response(&body)
    }

    fn generate_sync(&self, prompt: &str) -> Result<Vec<u8>> {
        let quality = Some(self.config.image_quality.as_str()).filter(|q| !q.is_empty());
        let request = ImageRequest {
            model: &self.config.image_model,
            prompt,
            size: &self.config.image_size,
            quality,
            n: 1,
        };

        let response = self
            .agent
            .post(&self.endpoint("images/generations"))
            .header("Authorization", &format!("Bearer {}", self.config.api_key))
            .send_json(&request)?;
        let (status, body) = read_text(response)?;

        if !is_success(status) {
            return Err(SlideforgeError::image_generation(upstream_error(status, &body)));
        }

        match parse_image_response(&body)? {
            ImagePayload::Base64(data) => BASE64.decode(data.as_bytes()).map_err(|e| {
                SlideforgeError::image_generation(format!("Invalid b64_json payload: {}", e))
            }),
            ImagePayload::Url(url) => {
                debug!("Downloading generated image");
                let (status, bytes) = read_bytes(self.agent.get(&url).call()?)?;
                if !is_success(status) {
                    return Err(SlideforgeError::image_generation(format!(
                        "Image download failed with HTTP {}",
                        status
                    )));
                }
                if bytes.is_empty() {
                    return Err(SlideforgeError::image_generation("Downloaded image is empty"));
                }
                Ok(bytes)
            }
        }
    }
}

#[async_trait]
impl ChatBackend for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let client = self.clone();
        let prompt = prompt.to_string();
        run_blocking("chat completion", move || client.complete_sync(&prompt)).await
    }

    fn name(&self) -> &'static str {
        "openai-chat"
    }
}

#[async_trait]
impl ImageBackend for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>> {
        let client = self.clone();
        let prompt = prompt.to_string();
        run_blocking("image generation", move || client.generate_sync(&prompt)).await
    }

    fn name(&self) -> &'static str {
        "openai-images"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_response() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"a\":1}"}}]}"#;
        assert_eq!(parse_chat_response(body).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_parse_chat_response_without_choices() {
        let err = parse_chat_response(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, SlideforgeError::Llm(_)));
    }

    #[test]
    fn test_parse_image_response_variants() {
        assert_eq!(
            parse_image_response(r#"{"data":[{"url":"https://img/1.png"}]}"#).unwrap(),
            ImagePayload::Url("https://img/1.png".into())
        );
        assert_eq!(
            parse_image_response(r#"{"data":[{"b64_json":"iVBORw0KGgo="}]}"#).unwrap(),
            ImagePayload::Base64("iVBORw0KGgo=".into())
        );
        assert!(parse_image_response(r#"{"data":[]}"#).is_err());
        assert!(parse_image_response(r#"{"data":[{}]}"#).is_err());
    }

    #[test]
    fn test_upstream_error_prefers_message() {
        let msg = upstream_error(429, r#"{"error":{"message":"Rate limit reached"}}"#);
        assert_eq!(msg, "HTTP 429: Rate limit reached");
        assert_eq!(upstream_error(502, "Bad Gateway"), "HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_image_request_omits_empty_quality() {
        let request = ImageRequest {
            model: "dall-e-3",
            prompt: "p",
            size: "1024x1024",
            quality: None,
            n: 1,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("quality").is_none());
        assert_eq!(json["n"], 1);
    }

    #[tokio::test]
    #[ignore] // 需要网络和 OPENAI_API_KEY
    async fn test_real_chat_completion() {
        let mut config = OpenAiConfig::default();
        config.api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        let client = OpenAiClient::new(&config);
        let reply = client.complete("Reply with the word ok").await.unwrap();
        assert!(!reply.is_empty());
    }
}

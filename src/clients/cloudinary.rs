//! Cloudinary raw 资源上传
//!
//! 签名上传：参数按 key 排序拼成 `k=v&...`，末尾拼接 api_secret 后取 SHA-1。
//! 超过 `chunk_size` 的文件按分片上传，
//! 每片携带 `X-Unique-Upload-Id` 与 `Content-Range`。

use async_trait::async_trait;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::{debug, info};
use ureq::Agent;

use super::ObjectStore;
use super::http::{build_agent, is_success, read_text, run_blocking, truncate_for_log};
use super::multipart::MultipartForm;
use crate::config::CloudinaryConfig;
use crate::errors::{Result, SlideforgeError};

/// 不参与签名的字段
const UNSIGNED_PARAMS: &[&str] = &["file", "api_key", "resource_type", "cloud_name"];

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    secure_url: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<UploadErrorBody>,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    message: String,
}

/// 计算上传签名
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut signed: Vec<&(&str, String)> = params
        .iter()
        .filter(|(k, v)| !UNSIGNED_PARAMS.contains(k) && !v.is_empty())
        .collect();
    signed.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = signed
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut sha = Sha1::new();
    sha.update(to_sign.as_bytes());
    sha.update(api_secret.as_bytes());
    hex::encode(sha.finalize())
}

/// 按分片大小切分，返回 (起始偏移, 结束偏移（含）)
pub fn chunk_ranges(total: usize, chunk_size: usize) -> Vec<(usize, usize)> {
    if total == 0 {
        return vec![(0, 0)];
    }
    let chunk_size = chunk_size.max(1);
    (0..total)
        .step_by(chunk_size)
        .map(|start| (start, (start + chunk_size).min(total) - 1))
        .collect()
}

/// 目录前缀 + 文件名；目录为空时只有文件名
pub fn public_id_in(folder: &str, name: &str) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}

/// 解析上传响应，返回 secure_url
pub fn parse_upload_response(status: u16, body: &str) -> Result<String> {
    let parsed: std::result::Result<UploadResponse, _> = serde_json::from_str(body);

    match parsed {
        Ok(UploadResponse {
            error: Some(err), ..
        }) => Err(SlideforgeError::upload(format!(
            "Cloudinary rejected upload (HTTP {}): {}",
            status, err.message
        ))),
        Ok(_) if !is_success(status) => Err(SlideforgeError::upload(format!(
            "Cloudinary upload failed with HTTP {}",
            status
        ))),
        Ok(resp) => resp
            .secure_url
            .or(resp.url)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| SlideforgeError::upload("Cloudinary response missing secure_url")),
        Err(_) => Err(SlideforgeError::upload(format!(
            "Unexpected Cloudinary response (HTTP {}): {}",
            status,
            truncate_for_log(body, 200)
        ))),
    }
}

/// Cloudinary 上传客户端
#[derive(Clone)]
pub struct CloudinaryClient {
    agent: Agent,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self {
            agent: build_agent(config.timeout_secs),
            config: config.clone(),
        }
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/v1_1/{}/raw/upload",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name
        )
    }

    fn signed_form(&self, public_id: &str, timestamp: &str) -> MultipartForm {
        let params = [
            ("public_id", public_id.to_string()),
            ("overwrite", "true".to_string()),
            ("timestamp", timestamp.to_string()),
        ];
        let signature = sign_params(&params, &self.config.api_secret);

        MultipartForm::new()
            .text("api_key", &self.config.api_key)
            .text("public_id", public_id)
            .text("overwrite", "true")
            .text("timestamp", timestamp)
            .text("signature", &signature)
    }

    fn upload_sync(&self, public_id: &str, bytes: &[u8]) -> Result<String> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let url = self.upload_url();
        let filename = format!(
            "{}.pptx",
            public_id.rsplit('/').next().unwrap_or(public_id)
        );

        if bytes.len() <= self.config.chunk_size {
            let (content_type, body) = self
                .signed_form(public_id, &timestamp)
                .file("file", &filename, "application/octet-stream", bytes)
                .finish();
            let response = self
                .agent
                .post(&url)
                .header("Content-Type", &content_type)
                .send(&body[..])?;
            let (status, text) = read_text(response)?;
            return parse_upload_response(status, &text);
        }

        let upload_id = uuid::Uuid::new_v4().simple().to_string();
        let ranges = chunk_ranges(bytes.len(), self.config.chunk_size);
        let total = bytes.len();
        info!(
            "Uploading {} bytes to Cloudinary in {} chunks",
            total,
            ranges.len()
        );

        let mut last = None;
        for (index, (start, end)) in ranges.iter().copied().enumerate() {
            let (content_type, body) = self
                .signed_form(public_id, &timestamp)
                .file(
                    "file",
                    &filename,
                    "application/octet-stream",
                    &bytes[start..=end],
                )
                .finish();
            let response = self
                .agent
                .post(&url)
                .header("Content-Type", &content_type)
                .header("X-Unique-Upload-Id", &upload_id)
                .header("Content-Range", &format!("bytes {}-{}/{}", start, end, total))
                .send(&body[..])?;
            let (status, text) = read_text(response)?;

            if index + 1 < ranges.len() {
                // 中间分片只检查错误
                if !is_success(status) {
                    return Err(parse_upload_response(status, &text)
                        .err()
                        .unwrap_or_else(|| {
                            SlideforgeError::upload(format!("Chunk {} failed", index + 1))
                        }));
                }
                debug!("Chunk {}/{} accepted", index + 1, ranges.len());
            } else {
                last = Some(parse_upload_response(status, &text));
            }
        }

        last.unwrap_or_else(|| Err(SlideforgeError::upload("No chunks were uploaded")))
    }
}

#[async_trait]
impl ObjectStore for CloudinaryClient {
    async fn upload(&self, public_id: &str, bytes: &[u8]) -> Result<String> {
        let client = self.clone();
        let public_id = public_id.to_string();
        let bytes = bytes.to_vec();
        run_blocking("cloudinary upload", move || {
            client.upload_sync(&public_id, &bytes)
        })
        .await
    }

    fn name(&self) -> &'static str {
        "cloudinary"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_params_sorted_and_filtered() {
        // sha1("overwrite=true&public_id=ppt/presentation_1&timestamp=1secret")
        let params = [
            ("timestamp", "1".to_string()),
            ("public_id", "ppt/presentation_1".to_string()),
            ("api_key", "ignored".to_string()),
            ("overwrite", "true".to_string()),
        ];
        let signature = sign_params(&params, "secret");

        let mut sha = Sha1::new();
        sha.update(b"overwrite=true&public_id=ppt/presentation_1&timestamp=1secret");
        assert_eq!(signature, hex::encode(sha.finalize()));
        assert_eq!(signature.len(), 40);
    }

    #[test]
    fn test_chunk_ranges() {
        assert_eq!(chunk_ranges(10, 4), vec![(0, 3), (4, 7), (8, 9)]);
        assert_eq!(chunk_ranges(8, 4), vec![(0, 3), (4, 7)]);
        assert_eq!(chunk_ranges(3, 6_000_000), vec![(0, 2)]);
    }

    #[test]
    fn test_parse_upload_response() {
        assert_eq!(
            parse_upload_response(200, r#"{"secure_url":"https://res/x.pptx"}"#).unwrap(),
            "https://res/x.pptx"
        );

        let err = parse_upload_response(401, r#"{"error":{"message":"Invalid Signature"}}"#)
            .unwrap_err();
        assert!(err.message().contains("Invalid Signature"));

        assert!(parse_upload_response(500, "<html>").is_err());
        assert!(parse_upload_response(200, "{}").is_err());
    }

    #[test]
    fn test_public_id_in_folder() {
        assert_eq!(public_id_in("ppt", "presentation_1"), "ppt/presentation_1");
        assert_eq!(public_id_in("", "presentation_1"), "presentation_1");
        assert_eq!(public_id_in("/decks/", "p"), "decks/p");
    }
}

//! ureq 同步客户端的公共部分
//!
//! ureq 是阻塞式的，所有调用都放进 `spawn_blocking` 执行

use std::time::Duration;

use ureq::Agent;
use ureq::http::Response;

use crate::errors::{Result, SlideforgeError};

/// 响应体读取上限（配图下载和 base64 JSON 都可能超过 ureq 默认的 10 MiB）
pub const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// 构建带全局超时的 Agent
///
/// 非 2xx 状态不作为错误返回，便于读取上游的错误信息
pub fn build_agent(timeout_secs: u64) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(timeout_secs)))
        .http_status_as_error(false)
        .user_agent(concat!("slideforge/", env!("CARGO_PKG_VERSION")))
        .build()
        .into()
}

/// 读取响应体为字符串，返回 (状态码, 内容)
pub fn read_text(response: Response<ureq::Body>) -> Result<(u16, String)> {
    let status = response.status().as_u16();
    let mut body = response.into_body();
    let body = body.with_config().limit(MAX_BODY_BYTES).read_to_string()?;
    Ok((status, body))
}

/// 读取响应体为字节
pub fn read_bytes(response: Response<ureq::Body>) -> Result<(u16, Vec<u8>)> {
    let status = response.status().as_u16();
    let mut body = response.into_body();
    let body = body.with_config().limit(MAX_BODY_BYTES).read_to_vec()?;
    Ok((status, body))
}

pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// 在阻塞线程池执行同步请求
pub async fn run_blocking<T, F>(operation_name: &'static str, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        SlideforgeError::http(format!("{} worker failed: {}", operation_name, e))
    })?
}

/// 截断过长的上游错误信息，避免日志被整页 HTML 淹没
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(truncate_for_log("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn test_is_success() {
        assert!(is_success(200));
        assert!(is_success(201));
        assert!(!is_success(302));
        assert!(!is_success(500));
    }

    #[tokio::test]
    async fn test_run_blocking_propagates_result() {
        let value = run_blocking("test", || Ok(41 + 1)).await.unwrap();
        assert_eq!(value, 42);

        let err = run_blocking::<(), _>("test", || Err(SlideforgeError::upload("nope")))
            .await
            .unwrap_err();
        assert!(matches!(err, SlideforgeError::Upload(_)));
    }
}

//! 外部调用重试模块
//!
//! 指数退避 + 随机抖动，用于配图生成等幂等的网络请求

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::ImageConfig;
use crate::errors::{Result, SlideforgeError};

/// 判断错误是否可重试：只有网络与上游服务错误值得再试
pub fn is_retryable_error(err: &SlideforgeError) -> bool {
    matches!(
        err,
        SlideforgeError::Http(_)
            | SlideforgeError::Llm(_)
            | SlideforgeError::ImageGeneration(_)
            | SlideforgeError::Upload(_)
    )
}

/// 重试配置
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 1000,
            max_delay_ms: 8000,
        }
    }
}

impl From<&ImageConfig> for RetryConfig {
    fn from(config: &ImageConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        }
    }
}

/// 指数退避重试执行器
///
/// 共 `max_retries + 1` 次尝试；不可重试的错误立即返回
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        "Operation '{}' succeeded after {} retries",
                        operation_name, attempt
                    );
                }
                return Ok(result);
            }
            Err(e) if is_retryable_error(&e) && attempt < config.max_retries => {
                attempt += 1;
                let delay = calculate_backoff(attempt, config.base_delay_ms, config.max_delay_ms);
                warn!(
                    "Operation '{}' failed (attempt {}/{}): {}; retrying in {} ms",
                    operation_name,
                    attempt,
                    config.max_retries + 1,
                    e,
                    delay
                );
                sleep(Duration::from_millis(delay)).await;
            }
            Err(e) => {
                debug!(
                    "Operation '{}' gave up after {} attempts: {}",
                    operation_name,
                    attempt + 1,
                    e
                );
                return Err(e);
            }
        }
    }
}

/// 计算指数退避延迟（带 0-25% 抖动）
pub(crate) fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    let exp_delay = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp_delay.min(max_ms);
    let jitter = rand::random_range(0..=capped / 4);
    capped.saturating_add(jitter)
}

//! 配置校验模块
//!
//! 启动前检查凭据与数值范围，一次性返回所有问题。

use super::StaticConfig;

/// 校验场景：本地生成不需要上传凭据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// HTTP 服务或需要上传的 CLI 生成
    Serve,
    /// `generate --output`，成品只写本地
    LocalOnly,
}

/// 校验配置，返回全部问题
pub fn validate_config(config: &StaticConfig, mode: ValidationMode) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    if config.openai.api_key.trim().is_empty() {
        problems.push(
            "openai.api_key is required (set SF__OPENAI__API_KEY or OPENAI_API_KEY)".to_string(),
        );
    }
    if let Err(e) = validate_base_url("openai.base_url", &config.openai.base_url) {
        problems.push(e);
    }
    if !(0.0..=2.0).contains(&config.openai.temperature) {
        problems.push(format!(
            "openai.temperature must be between 0.0 and 2.0, got {}",
            config.openai.temperature
        ));
    }
    if let Err(e) = validate_image_size(&config.openai.image_size) {
        problems.push(e);
    }

    if mode == ValidationMode::Serve {
        let cloudinary = &config.cloudinary;
        for (name, value, legacy) in [
            ("cloud_name", &cloudinary.cloud_name, "CLOUDINARY_CLOUD_NAME"),
            ("api_key", &cloudinary.api_key, "CLOUDINARY_API_KEY"),
            ("api_secret", &cloudinary.api_secret, "CLOUDINARY_API_SECRET"),
        ] {
            if value.trim().is_empty() {
                problems.push(format!(
                    "cloudinary.{} is required (set SF__CLOUDINARY__{} or {})",
                    name,
                    name.to_uppercase(),
                    legacy
                ));
            }
        }
        if let Err(e) = validate_base_url("cloudinary.api_base", &cloudinary.api_base) {
            problems.push(e);
        }
    }

    if config.cloudinary.chunk_size < 5 * 1024 * 1024 {
        problems.push(format!(
            "cloudinary.chunk_size must be at least 5 MiB, got {}",
            config.cloudinary.chunk_size
        ));
    }

    if config.images.max_workers == 0 {
        problems.push("images.max_workers must be greater than 0".to_string());
    }
    if config.images.cache_dir.trim().is_empty() {
        problems.push("images.cache_dir must not be empty".to_string());
    }
    if config.images.retry_base_delay_ms > config.images.retry_max_delay_ms {
        problems.push(format!(
            "images.retry_base_delay_ms ({}) must not exceed images.retry_max_delay_ms ({})",
            config.images.retry_base_delay_ms, config.images.retry_max_delay_ms
        ));
    }

    if config.deck.min_slides == 0 {
        problems.push("deck.min_slides must be at least 1".to_string());
    }
    if let Some(max) = config.deck.effective_max_slides()
        && max < config.deck.min_slides
    {
        problems.push(format!(
            "deck.max_slides ({}) must not be below deck.min_slides ({})",
            max, config.deck.min_slides
        ));
    }

    if config.server.max_payload_bytes == 0 {
        problems.push("server.max_payload_bytes must be greater than 0".to_string());
    }

    if config.api_key_enforced() && config.auth.api_keys.is_empty() {
        problems.push(format!(
            "profile '{}' requires at least one key in auth.api_keys (or API_KEYS)",
            config.deck.profile
        ));
    }
    if config.auth.header.trim().is_empty() {
        problems.push("auth.header must not be empty".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

fn validate_base_url(field: &str, value: &str) -> Result<(), String> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(format!(
            "{} must start with http:// or https://, got '{}'",
            field, value
        ))
    }
}

/// 图像尺寸格式：WIDTHxHEIGHT
fn validate_image_size(value: &str) -> Result<(), String> {
    let valid = value
        .split_once('x')
        .map(|(w, h)| w.parse::<u32>().is_ok() && h.parse::<u32>().is_ok())
        .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err(format!(
            "openai.image_size must look like 1024x1024, got '{}'",
            value
        ))
    }
}

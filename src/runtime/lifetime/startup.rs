use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::{StaticConfig, ValidationMode, get_config, validate_config};
use crate::services::PresentationService;

pub struct StartupContext {
    pub config: Arc<StaticConfig>,
    pub service: Arc<PresentationService>,
}

/// 校验配置并返回全部问题，供启动与 `config check` 共用
pub fn check_config(config: &StaticConfig, mode: ValidationMode) -> Result<()> {
    if let Err(problems) = validate_config(config, mode) {
        bail!(
            "Invalid configuration:\n{}",
            problems
                .iter()
                .map(|p| format!("  - {}", p))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
    Ok(())
}

/// 构建生成服务并准备缓存目录
pub async fn prepare_service(
    config: &StaticConfig,
    mode: ValidationMode,
) -> Result<Arc<PresentationService>> {
    check_config(config, mode)?;

    let service = PresentationService::from_config(config);
    service
        .image_generator()
        .ensure_cache_dir()
        .await
        .context("Failed to prepare image cache directory")?;
    debug!(
        "Image cache ready at {}",
        service.image_generator().cache_dir().display()
    );

    Ok(Arc::new(service))
}

/// 准备服务器启动的上下文
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let config = get_config();
    let service = prepare_service(&config, ValidationMode::Serve).await?;

    info!(
        "Profile '{}' ready (API key {}) in {:?}",
        config.deck.profile,
        if config.api_key_enforced() {
            "required"
        } else {
            "not required"
        },
        start_time.elapsed()
    );

    Ok(StartupContext { config, service })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_config_lists_every_problem() {
        let config = StaticConfig::default();
        let err = check_config(&config, ValidationMode::Serve).unwrap_err().to_string();
        assert!(err.contains("openai.api_key"));
        assert!(err.contains("cloudinary.cloud_name"));
    }

    #[tokio::test]
    async fn test_prepare_service_creates_cache_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StaticConfig::default();
        config.openai.api_key = "sk-test".into();
        config.images.cache_dir = dir.path().join("cache").to_string_lossy().into_owned();

        let service = prepare_service(&config, ValidationMode::LocalOnly)
            .await
            .unwrap();
        assert!(service.image_generator().cache_dir().is_dir());
    }
}

use serde::{Deserialize, Serialize};

use super::types::{LogFormat, Profile};

/// 环境变量前缀，例如 SF__SERVER__PORT=5001
pub const ENV_PREFIX: &str = "SF";

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML / 环境变量加载，启动时使用）
///
/// 包含：
/// - server: 监听地址、端口、worker 数量
/// - openai: 大纲与配图接口
/// - cloudinary: 成品上传
/// - images: 配图缓存与并发
/// - deck: profile 与请求校验
/// - auth: API Key
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub cloudinary: CloudinaryConfig,
    #[serde(default)]
    pub images: ImageConfig,
    #[serde(default)]
    pub deck: DeckConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：SF，分隔符：__
    /// 示例：SF__SERVER__PORT=9999
    ///
    /// 结构化字段为空时，回退读取旧的环境变量名（OPENAI_API_KEY 等）。
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 SF，分隔符 __
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config = match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        };

        config.apply_legacy_env(|key| std::env::var(key).ok());
        config
    }

    /// 用旧的环境变量名填充未配置的凭据
    ///
    /// `lookup` 便于测试时注入变量表。
    pub fn apply_legacy_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn fill<F: Fn(&str) -> Option<String>>(slot: &mut String, key: &str, lookup: &F) {
            if slot.is_empty()
                && let Some(value) = lookup(key)
            {
                *slot = value.trim().to_string();
            }
        }

        fill(&mut self.openai.api_key, "OPENAI_API_KEY", &lookup);
        fill(&mut self.cloudinary.cloud_name, "CLOUDINARY_CLOUD_NAME", &lookup);
        fill(&mut self.cloudinary.api_key, "CLOUDINARY_API_KEY", &lookup);
        fill(&mut self.cloudinary.api_secret, "CLOUDINARY_API_SECRET", &lookup);

        if self.auth.api_keys.is_empty()
            && let Some(keys) = lookup("API_KEYS")
        {
            self.auth.api_keys = keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect();
        }
    }

    /// 当前部署是否需要校验 API Key
    pub fn api_key_enforced(&self) -> bool {
        self.deck.profile.requires_api_key() || !self.auth.api_keys.is_empty()
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// JSON 请求体上限（字节）
    #[serde(default = "default_max_payload")]
    pub max_payload_bytes: usize,
}

/// OpenAI 接口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_image_size")]
    pub image_size: String,
    /// 为空时不发送 quality 字段
    #[serde(default = "default_image_quality")]
    pub image_quality: String,
    /// 单次请求超时（秒）
    #[serde(default = "default_openai_timeout")]
    pub timeout_secs: u64,
}

/// Cloudinary 上传配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudinaryConfig {
    #[serde(default)]
    pub cloud_name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default = "default_cloudinary_api_base")]
    pub api_base: String,
    #[serde(default = "default_cloudinary_folder")]
    pub folder: String,
    /// 超过该大小时分片上传（字节）
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_upload_timeout")]
    pub timeout_secs: u64,
}

/// 配图生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    #[serde(default = "default_image_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 演示文稿与请求校验配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckConfig {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default = "default_min_slides")]
    pub min_slides: u32,
    /// 为空时使用 profile 默认值（fullscreen 为 20，其余不限）
    #[serde(default)]
    pub max_slides: Option<u32>,
    /// 为空时使用 profile 默认值（fullscreen 为 20，其余为 1）
    #[serde(default)]
    pub min_summary_chars: Option<usize>,
    /// 上传失败时写入本地的目录；为空则不回退
    #[serde(default)]
    pub local_fallback_dir: Option<String>,
}

impl DeckConfig {
    pub fn effective_max_slides(&self) -> Option<u32> {
        self.max_slides.or(match self.profile {
            Profile::Fullscreen => Some(20),
            _ => None,
        })
    }

    pub fn effective_min_summary_chars(&self) -> usize {
        self.min_summary_chars.unwrap_or(match self.profile {
            Profile::Fullscreen => 20,
            _ => 1,
        })
    }
}

/// API Key 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub api_keys: Vec<String>,
    #[serde(default = "default_api_key_header")]
    pub header: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    5000
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_max_payload() -> usize {
    10 * 1024 * 1024
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

fn default_image_quality() -> String {
    "hd".to_string()
}

fn default_openai_timeout() -> u64 {
    120
}

fn default_cloudinary_api_base() -> String {
    "https://api.cloudinary.com".to_string()
}

fn default_cloudinary_folder() -> String {
    "ppt".to_string()
}

fn default_chunk_size() -> usize {
    6_000_000
}

fn default_upload_timeout() -> u64 {
    120
}

fn default_cache_dir() -> String {
    "img_cache".to_string()
}

fn default_max_workers() -> usize {
    4
}

fn default_image_retries() -> u32 {
    2
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

fn default_retry_max_delay_ms() -> u64 {
    8000
}

fn default_min_slides() -> u32 {
    1
}

fn default_api_key_header() -> String {
    "X-API-KEY".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            max_payload_bytes: default_max_payload(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base_url(),
            chat_model: default_chat_model(),
            temperature: default_temperature(),
            image_model: default_image_model(),
            image_size: default_image_size(),
            image_quality: default_image_quality(),
            timeout_secs: default_openai_timeout(),
        }
    }
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            api_base: default_cloudinary_api_base(),
            folder: default_cloudinary_folder(),
            chunk_size: default_chunk_size(),
            timeout_secs: default_upload_timeout(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            max_workers: default_max_workers(),
            max_retries: default_image_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            min_slides: default_min_slides(),
            max_slides: None,
            min_summary_chars: None,
            local_fallback_dir: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            header: default_api_key_header(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_legacy_env_fills_empty_credentials() {
        let vars: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("CLOUDINARY_CLOUD_NAME", "demo"),
            ("CLOUDINARY_API_KEY", "123"),
            ("CLOUDINARY_API_SECRET", "secret"),
            ("API_KEYS", "alpha, beta,,"),
        ]
        .into_iter()
        .collect();

        let mut config = StaticConfig::default();
        config.apply_legacy_env(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.openai.api_key, "sk-test");
        assert_eq!(config.cloudinary.cloud_name, "demo");
        assert_eq!(config.cloudinary.api_secret, "secret");
        assert_eq!(config.auth.api_keys, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_legacy_env_does_not_override_structured_values() {
        let mut config = StaticConfig::default();
        config.openai.api_key = "from-toml".to_string();
        config.apply_legacy_env(|_| Some("from-env".to_string()));
        assert_eq!(config.openai.api_key, "from-toml");
    }

    #[test]
    fn test_profile_limits() {
        let mut deck = DeckConfig::default();
        assert_eq!(deck.effective_max_slides(), None);
        assert_eq!(deck.effective_min_summary_chars(), 1);

        deck.profile = Profile::Fullscreen;
        assert_eq!(deck.effective_max_slides(), Some(20));
        assert_eq!(deck.effective_min_summary_chars(), 20);

        deck.max_slides = Some(8);
        assert_eq!(deck.effective_max_slides(), Some(8));
    }

    #[test]
    fn test_sample_config_roundtrips_through_toml() {
        let sample = StaticConfig::generate_sample_config();
        assert!(sample.contains("[openai]"));
        let parsed: StaticConfig = toml::from_str(&sample).expect("sample config should parse");
        assert_eq!(parsed.server.port, 5000);
        assert_eq!(parsed.deck.profile, Profile::Classic);
    }
}

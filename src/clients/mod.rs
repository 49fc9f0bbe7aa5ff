//! 外部服务客户端
//!
//! 三个协作方各自对应一个 trait，便于在测试中替换为进程内实现：
//! - `ChatBackend`: 生成幻灯片大纲
//! - `ImageBackend`: 生成配图
//! - `ObjectStore`: 托管最终的 PPTX

use async_trait::async_trait;

use crate::errors::Result;

pub mod cloudinary;
pub mod http;
pub mod multipart;
pub mod openai;

pub use cloudinary::CloudinaryClient;
pub use openai::OpenAiClient;

/// 对话补全接口
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// 发送单条 user 消息，返回模型回复的原始文本
    async fn complete(&self, prompt: &str) -> Result<String>;

    fn name(&self) -> &'static str;
}

/// 图像生成接口
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// 根据提示词生成一张图片，返回编码后的字节（PNG）
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>>;

    fn name(&self) -> &'static str;
}

/// 对象存储接口
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// 上传文件，返回公开访问 URL
    async fn upload(&self, public_id: &str, bytes: &[u8]) -> Result<String>;

    fn name(&self) -> &'static str;
}

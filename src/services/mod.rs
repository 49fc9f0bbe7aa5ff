//! 业务服务层
//!
//! HTTP 接口与 CLI 共用同一条生成流水线。

pub mod image_generator;
pub mod presentation;
pub mod retry;

pub use image_generator::{ImageGenerator, PromptStyle};
pub use presentation::{BuiltDeck, DeckSource, GeneratedDeck, PresentationService};
pub use retry::{RetryConfig, with_retry};

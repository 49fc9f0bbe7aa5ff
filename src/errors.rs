use std::fmt;

#[derive(Debug, Clone)]
pub enum SlideforgeError {
    Config(String),
    Validation(String),
    Llm(String),
    PlanParse(String),
    ImageGeneration(String),
    DeckBuild(String),
    Upload(String),
    FileOperation(String),
    Serialization(String),
    Http(String),
}

impl SlideforgeError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            SlideforgeError::Config(_) => "E001",
            SlideforgeError::Validation(_) => "E002",
            SlideforgeError::Llm(_) => "E003",
            SlideforgeError::PlanParse(_) => "E004",
            SlideforgeError::ImageGeneration(_) => "E005",
            SlideforgeError::DeckBuild(_) => "E006",
            SlideforgeError::Upload(_) => "E007",
            SlideforgeError::FileOperation(_) => "E008",
            SlideforgeError::Serialization(_) => "E009",
            SlideforgeError::Http(_) => "E010",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            SlideforgeError::Config(_) => "Configuration Error",
            SlideforgeError::Validation(_) => "Validation Error",
            SlideforgeError::Llm(_) => "Language Model Error",
            SlideforgeError::PlanParse(_) => "Slide Plan Parse Error",
            SlideforgeError::ImageGeneration(_) => "Image Generation Error",
            SlideforgeError::DeckBuild(_) => "Deck Build Error",
            SlideforgeError::Upload(_) => "Upload Error",
            SlideforgeError::FileOperation(_) => "File Operation Error",
            SlideforgeError::Serialization(_) => "Serialization Error",
            SlideforgeError::Http(_) => "HTTP Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            SlideforgeError::Config(msg)
            | SlideforgeError::Validation(msg)
            | SlideforgeError::Llm(msg)
            | SlideforgeError::PlanParse(msg)
            | SlideforgeError::ImageGeneration(msg)
            | SlideforgeError::DeckBuild(msg)
            | SlideforgeError::Upload(msg)
            | SlideforgeError::FileOperation(msg)
            | SlideforgeError::Serialization(msg)
            | SlideforgeError::Http(msg) => msg,
        }
    }

    /// HTTP 状态码映射：只有校验错误属于客户端错误
    pub fn status_code(&self) -> u16 {
        match self {
            SlideforgeError::Validation(_) => 400,
            _ => 500,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    #[cfg(feature = "server")]
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SlideforgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SlideforgeError {}

// 便捷的构造函数
impl SlideforgeError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        SlideforgeError::Config(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        SlideforgeError::Validation(msg.into())
    }

    pub fn llm<T: Into<String>>(msg: T) -> Self {
        SlideforgeError::Llm(msg.into())
    }

    pub fn plan_parse<T: Into<String>>(msg: T) -> Self {
        SlideforgeError::PlanParse(msg.into())
    }

    pub fn image_generation<T: Into<String>>(msg: T) -> Self {
        SlideforgeError::ImageGeneration(msg.into())
    }

    pub fn deck_build<T: Into<String>>(msg: T) -> Self {
        SlideforgeError::DeckBuild(msg.into())
    }

    pub fn upload<T: Into<String>>(msg: T) -> Self {
        SlideforgeError::Upload(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        SlideforgeError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        SlideforgeError::Serialization(msg.into())
    }

    pub fn http<T: Into<String>>(msg: T) -> Self {
        SlideforgeError::Http(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for SlideforgeError {
    fn from(err: std::io::Error) -> Self {
        SlideforgeError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SlideforgeError {
    fn from(err: serde_json::Error) -> Self {
        SlideforgeError::Serialization(err.to_string())
    }
}

impl From<ureq::Error> for SlideforgeError {
    fn from(err: ureq::Error) -> Self {
        SlideforgeError::Http(err.to_string())
    }
}

impl From<std::fmt::Error> for SlideforgeError {
    fn from(err: std::fmt::Error) -> Self {
        SlideforgeError::DeckBuild(format!("Failed to render XML: {}", err))
    }
}

impl From<zip::result::ZipError> for SlideforgeError {
    fn from(err: zip::result::ZipError) -> Self {
        SlideforgeError::DeckBuild(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SlideforgeError>;

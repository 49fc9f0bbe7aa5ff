//! 最小 multipart/form-data 编码器
//!
//! ureq 3 不自带表单编码，上传 Cloudinary 只需要文本字段加一个文件

use std::fmt::Write as _;

pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::with_boundary(format!("----slideforge{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        let mut head = String::new();
        let _ = write!(
            head,
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n",
            self.boundary, name
        );
        self.body.extend_from_slice(head.as_bytes());
        self.body.extend_from_slice(value.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        let mut head = String::new();
        let _ = write!(
            head,
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            self.boundary, name, filename, content_type
        );
        self.body.extend_from_slice(head.as_bytes());
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    /// 结束表单，返回 (Content-Type 头, 请求体)
    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multipart_layout() {
        let (content_type, body) = MultipartForm::with_boundary("XYZ")
            .text("timestamp", "100")
            .file("file", "deck.pptx", "application/octet-stream", b"PK")
            .finish();

        assert_eq!(content_type, "multipart/form-data; boundary=XYZ");
        let body = String::from_utf8(body).unwrap();
        assert_eq!(
            body,
            "--XYZ\r\nContent-Disposition: form-data; name=\"timestamp\"\r\n\r\n100\r\n\
             --XYZ\r\nContent-Disposition: form-data; name=\"file\"; filename=\"deck.pptx\"\r\n\
             Content-Type: application/octet-stream\r\n\r\nPK\r\n--XYZ--\r\n"
        );
    }

    #[test]
    fn test_random_boundaries_differ() {
        let (a, _) = MultipartForm::new().finish();
        let (b, _) = MultipartForm::new().finish();
        assert_ne!(a, b);
    }
}

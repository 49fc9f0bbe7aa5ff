use slideforge::errors::{Result, SlideforgeError};
use std::error::Error;

#[cfg(test)]
mod error_creation_tests {
    use super::*;

    #[test]
    fn test_constructors_pick_variant() {
        assert!(matches!(SlideforgeError::config("x"), SlideforgeError::Config(_)));
        assert!(matches!(SlideforgeError::llm("x"), SlideforgeError::Llm(_)));
        assert!(matches!(SlideforgeError::plan_parse("x"), SlideforgeError::PlanParse(_)));
        assert!(matches!(
            SlideforgeError::image_generation("x"),
            SlideforgeError::ImageGeneration(_)
        ));
        assert!(matches!(SlideforgeError::deck_build("x"), SlideforgeError::DeckBuild(_)));
        assert!(matches!(SlideforgeError::upload("x"), SlideforgeError::Upload(_)));
        assert!(matches!(SlideforgeError::http("x"), SlideforgeError::Http(_)));
    }

    #[test]
    fn test_display_includes_type_and_message() {
        let error = SlideforgeError::upload("Cloudinary returned 401");
        assert_eq!(error.to_string(), "Upload Error: Cloudinary returned 401");
        assert_eq!(error.message(), "Cloudinary returned 401");
        assert!(error.source().is_none());
    }
}

#[cfg(test)]
mod error_code_tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let errors = [
            SlideforgeError::config(""),
            SlideforgeError::validation(""),
            SlideforgeError::llm(""),
            SlideforgeError::plan_parse(""),
            SlideforgeError::image_generation(""),
            SlideforgeError::deck_build(""),
            SlideforgeError::upload(""),
            SlideforgeError::file_operation(""),
            SlideforgeError::serialization(""),
            SlideforgeError::http(""),
        ];
        let mut codes: Vec<&str> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert_eq!(SlideforgeError::config("").code(), "E001");
    }

    #[test]
    fn test_only_validation_is_client_error() {
        assert_eq!(SlideforgeError::validation("bad").status_code(), 400);
        assert_eq!(SlideforgeError::upload("down").status_code(), 500);
        assert_eq!(SlideforgeError::llm("busy").status_code(), 500);
    }

    #[test]
    fn test_colored_output_mentions_code() {
        let text = SlideforgeError::deck_build("empty").format_colored();
        assert!(text.contains("E006"));
        assert!(text.contains("empty"));
    }
}

#[cfg(test)]
mod conversion_tests {
    use super::*;

    fn read_missing() -> Result<Vec<u8>> {
        Ok(std::fs::read("/definitely/not/here.pptx")?)
    }

    #[test]
    fn test_io_error_becomes_file_operation() {
        assert!(matches!(read_missing(), Err(SlideforgeError::FileOperation(_))));
    }

    #[test]
    fn test_json_error_becomes_serialization() {
        let err: SlideforgeError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, SlideforgeError::Serialization(_)));
    }

    #[test]
    fn test_zip_error_becomes_deck_build() {
        let err: SlideforgeError = zip::ZipArchive::new(std::io::Cursor::new(b"not a zip".to_vec()))
            .unwrap_err()
            .into();
        assert!(matches!(err, SlideforgeError::DeckBuild(_)));
    }

    #[test]
    fn test_fmt_error_becomes_deck_build() {
        let err: SlideforgeError = std::fmt::Error.into();
        assert!(err.message().contains("Failed to render XML"));
    }
}

//! `POST /generate-ppt`

use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, http::StatusCode, web};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::types::{ErrorBody, GenerateRequest, GenerateResponse, ValidGenerateRequest};
use crate::api::middleware::{ApiKeyGuard, ApiKeySettings, request_id_of};
use crate::config::DeckConfig;
use crate::services::PresentationService;

/// 请求校验规则，由 deck 配置推导
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRules {
    pub min_slides: u32,
    pub max_slides: Option<u32>,
    pub min_summary_chars: usize,
    /// 接受 "5"、5.0 这类可转换为整数的 slide_count
    pub lenient_numbers: bool,
}

impl RequestRules {
    pub fn from_config(deck: &DeckConfig) -> Self {
        Self {
            min_slides: deck.min_slides.max(1),
            max_slides: deck.effective_max_slides(),
            min_summary_chars: deck.effective_min_summary_chars(),
            lenient_numbers: deck.profile.strict_slide_count(),
        }
    }

    /// 完整校验：Content-Type、请求体、字段
    pub fn check(
        &self,
        content_type: &str,
        body: &[u8],
    ) -> Result<ValidGenerateRequest, ErrorBody> {
        if !is_json_content_type(content_type) {
            return Err(ErrorBody::invalid_request(
                "Content-Type must be application/json",
            ));
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|_| ErrorBody::invalid_request("JSON body required"))?;
        let is_empty = match &value {
            Value::Object(map) => map.is_empty(),
            Value::Null => true,
            _ => return Err(ErrorBody::invalid_request("JSON body required")),
        };
        if is_empty {
            return Err(ErrorBody::invalid_request(self.empty_body_message()));
        }

        let request: GenerateRequest = serde_json::from_value(value)
            .map_err(|_| ErrorBody::invalid_request("JSON body required"))?;
        self.validate(&request)
    }

    pub fn validate(&self, request: &GenerateRequest) -> Result<ValidGenerateRequest, ErrorBody> {
        let slide_count = request
            .slide_count
            .as_ref()
            .and_then(|v| self.slide_count_of(v))
            .filter(|n| self.slide_count_in_range(*n))
            .ok_or_else(|| ErrorBody::invalid_parameter(self.slide_count_message()))?;

        let summary = match &request.summary {
            Some(Value::String(s)) => s.trim(),
            _ => "",
        };
        if summary.is_empty() || summary.chars().count() < self.min_summary_chars {
            return Err(ErrorBody::invalid_parameter(self.summary_message()));
        }

        Ok(ValidGenerateRequest {
            slide_count,
            summary: summary.to_string(),
        })
    }

    fn slide_count_of(&self, value: &Value) -> Option<u32> {
        match value {
            Value::Number(n) => match n.as_u64() {
                Some(v) => u32::try_from(v).ok(),
                None if self.lenient_numbers => n
                    .as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as u32),
                None => None,
            },
            Value::String(s) if self.lenient_numbers => s.trim().parse::<u32>().ok(),
            _ => None,
        }
    }

    fn slide_count_in_range(&self, n: u32) -> bool {
        n >= self.min_slides && self.max_slides.is_none_or(|max| n <= max)
    }

    fn slide_count_message(&self) -> String {
        match self.max_slides {
            Some(max) => format!(
                "slide_count must be an integer between {}-{}",
                self.min_slides, max
            ),
            None if self.min_slides <= 1 => "Valid slide_count (int > 0) required".to_string(),
            None => format!("Valid slide_count (int >= {}) required", self.min_slides),
        }
    }

    fn summary_message(&self) -> String {
        if self.min_summary_chars <= 1 {
            "Non-empty summary string required".to_string()
        } else {
            format!(
                "summary must be at least {} characters",
                self.min_summary_chars
            )
        }
    }

    fn empty_body_message(&self) -> &'static str {
        if self.lenient_numbers {
            "Empty JSON body"
        } else {
            "JSON body required"
        }
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type.trim().to_ascii_lowercase();
    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

pub struct GenerateService;

impl GenerateService {
    pub async fn generate_ppt(
        req: HttpRequest,
        body: web::Bytes,
        service: web::Data<Arc<PresentationService>>,
        rules: web::Data<RequestRules>,
    ) -> impl Responder {
        let request = match rules.check(req.content_type(), &body) {
            Ok(request) => request,
            Err(problem) => {
                warn!("Rejected generate request: {}", problem.error);
                return HttpResponse::BadRequest().json(problem);
            }
        };

        info!(
            "Generating presentation: {} slides, summary of {} chars",
            request.slide_count,
            request.summary.chars().count()
        );

        match service.generate(request.slide_count, &request.summary).await {
            Ok(deck) => {
                info!(
                    "Presentation ready ({} bytes, {}): {}",
                    deck.bytes,
                    deck.source.as_str(),
                    deck.url
                );
                HttpResponse::Ok().json(GenerateResponse::from_deck(&deck, request.slide_count))
            }
            Err(e) => {
                let trace_id = request_id_of(&req);
                error!("Presentation generation failed [{}]: {}", trace_id, e);
                let status = StatusCode::from_u16(e.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                HttpResponse::build(status)
                    .json(ErrorBody::generation_failed(e.message(), trace_id))
            }
        }
    }
}

/// 注册生成接口，按需挂载 API Key 校验
pub fn generate_routes(cfg: &mut web::ServiceConfig, api_keys: ApiKeySettings) {
    cfg.service(
        web::resource("/generate-ppt")
            .wrap(ApiKeyGuard::new(api_keys))
            .route(web::post().to(GenerateService::generate_ppt)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Profile, StaticConfig};

    fn rules_for(profile: Profile) -> RequestRules {
        let mut config = StaticConfig::default();
        config.deck.profile = profile;
        RequestRules::from_config(&config.deck)
    }

    fn check(rules: &RequestRules, body: &str) -> Result<ValidGenerateRequest, String> {
        rules
            .check("application/json", body.as_bytes())
            .map_err(|e| e.error)
    }

    #[test]
    fn test_content_type_required() {
        let rules = rules_for(Profile::Classic);
        let err = rules.check("text/plain", b"{}").unwrap_err();
        assert_eq!(err.error, "Content-Type must be application/json");
        assert_eq!(err.status, "invalid_request");
        assert!(is_json_content_type("application/vnd.api+json"));
    }

    #[test]
    fn test_empty_body_messages() {
        assert_eq!(
            check(&rules_for(Profile::Classic), "{}").unwrap_err(),
            "JSON body required"
        );
        assert_eq!(
            check(&rules_for(Profile::Fullscreen), "{}").unwrap_err(),
            "Empty JSON body"
        );
        assert_eq!(
            check(&rules_for(Profile::Fullscreen), "not json").unwrap_err(),
            "JSON body required"
        );
        assert_eq!(
            check(&rules_for(Profile::Classic), "[1, 2]").unwrap_err(),
            "JSON body required"
        );
    }

    #[test]
    fn test_classic_slide_count_must_be_positive_int() {
        let rules = rules_for(Profile::Classic);
        for body in [
            r#"{"slide_count": 0, "summary": "x"}"#,
            r#"{"slide_count": "3", "summary": "x"}"#,
            r#"{"slide_count": 2.5, "summary": "x"}"#,
            r#"{"slide_count": -1, "summary": "x"}"#,
            r#"{"summary": "x"}"#,
        ] {
            assert_eq!(
                check(&rules, body).unwrap_err(),
                "Valid slide_count (int > 0) required",
                "{}",
                body
            );
        }
        let ok = check(&rules, r#"{"slide_count": 40, "summary": "x"}"#).unwrap();
        assert_eq!(ok.slide_count, 40);
    }

    #[test]
    fn test_fullscreen_slide_count_range_and_coercion() {
        let rules = rules_for(Profile::Fullscreen);
        let summary = "A summary that is long enough to pass";
        let body = |count: &str| format!(r#"{{"slide_count": {}, "summary": "{}"}}"#, count, summary);

        assert_eq!(check(&rules, &body("\"7\"")).unwrap().slide_count, 7);
        assert_eq!(check(&rules, &body("3.9")).unwrap().slide_count, 3);
        assert_eq!(check(&rules, &body("20")).unwrap().slide_count, 20);
        for bad in ["21", "0", "\"many\""] {
            assert_eq!(
                check(&rules, &body(bad)).unwrap_err(),
                "slide_count must be an integer between 1-20"
            );
        }
    }

    #[test]
    fn test_summary_rules() {
        let classic = rules_for(Profile::Classic);
        assert_eq!(
            check(&classic, r#"{"slide_count": 2, "summary": "   "}"#).unwrap_err(),
            "Non-empty summary string required"
        );
        assert_eq!(
            check(&classic, r#"{"slide_count": 2, "summary": 42}"#).unwrap_err(),
            "Non-empty summary string required"
        );
        assert_eq!(
            check(&classic, r#"{"slide_count": 2, "summary": "  ok  "}"#)
                .unwrap()
                .summary,
            "ok"
        );

        let fullscreen = rules_for(Profile::Fullscreen);
        assert_eq!(
            check(&fullscreen, r#"{"slide_count": 2, "summary": "too short"}"#).unwrap_err(),
            "summary must be at least 20 characters"
        );
    }
}

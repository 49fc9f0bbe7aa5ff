use actix_web::{HttpResponse, Responder, web};
use tracing::trace;

use super::types::HealthResponse;
use crate::config::Profile;

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: chrono::Utc::now(),
        }
    }
}

/// Health Service
///
/// 不探测 OpenAI 与 Cloudinary：外部服务的可用性与本进程是否存活无关，
/// 且每次探测都会消耗配额。
pub struct HealthService;

impl HealthService {
    /// 存活检查，纯文本
    pub async fn live() -> impl Responder {
        trace!("Received liveness check request");
        HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body("Service is live ✅")
    }

    pub async fn health_check(
        app_start_time: web::Data<AppStartTime>,
        profile: web::Data<Profile>,
    ) -> impl Responder {
        trace!("Received health check request");
        let now = chrono::Utc::now();
        let uptime = (now - app_start_time.start_datetime).num_seconds().max(0) as u64;

        HttpResponse::Ok().json(HealthResponse {
            status: "healthy".to_string(),
            uptime,
            profile: profile.to_string(),
            timestamp: now.to_rfc3339(),
        })
    }
}

/// Health 路由配置
pub fn health_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(HealthService::live))
        .route("/", web::head().to(HealthService::live))
        .route("/health", web::get().to(HealthService::health_check))
        .route("/health", web::head().to(HealthService::health_check));
}

//! HTTP 接口层
//!
//! - `middleware`: request id、耗时日志、API Key
//! - `services`: 路由与 handler

pub mod middleware;
pub mod services;

use actix_web::web;
use std::sync::Arc;

use crate::config::{Profile, StaticConfig};
use crate::services::PresentationService;
use middleware::ApiKeySettings;
use services::{AppStartTime, RequestRules, generate_routes, health_routes};

/// 所有 worker 共享的状态
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PresentationService>,
    pub rules: RequestRules,
    pub api_keys: ApiKeySettings,
    pub profile: Profile,
    pub start_time: AppStartTime,
    pub max_payload_bytes: usize,
}

impl AppState {
    pub fn new(config: &StaticConfig, service: Arc<PresentationService>) -> Self {
        Self {
            service,
            rules: RequestRules::from_config(&config.deck),
            api_keys: ApiKeySettings::from_config(config),
            profile: config.deck.profile,
            start_time: AppStartTime::now(),
            max_payload_bytes: config.server.max_payload_bytes,
        }
    }
}

/// 注册共享数据与全部路由，服务器与测试共用
pub fn configure_app(cfg: &mut web::ServiceConfig, state: AppState) {
    cfg.app_data(web::Data::new(state.service))
        .app_data(web::Data::new(state.rules))
        .app_data(web::Data::new(state.profile))
        .app_data(web::Data::new(state.start_time))
        .app_data(web::PayloadConfig::new(state.max_payload_bytes));
    health_routes(cfg);
    generate_routes(cfg, state.api_keys);
}

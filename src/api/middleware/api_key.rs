//! API Key 校验中间件
//!
//! 请求头中的 key 与配置中的每个 key 逐一做常量时间比较。
//! 未启用时直接放行。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{info, trace};

use crate::api::services::types::ErrorBody;
use crate::config::StaticConfig;

/// 已加载的 key 列表
#[derive(Debug, Clone)]
pub struct ApiKeySettings {
    pub enforced: bool,
    pub header: String,
    pub keys: Vec<String>,
}

impl ApiKeySettings {
    pub fn from_config(config: &StaticConfig) -> Self {
        Self {
            enforced: config.api_key_enforced(),
            header: config.auth.header.clone(),
            keys: config
                .auth
                .api_keys
                .iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// 常量时间比较；不因首个匹配提前返回
    pub fn is_valid(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }
        let matched = self
            .keys
            .iter()
            .fold(subtle::Choice::from(0u8), |acc, key| {
                acc | key.as_bytes().ct_eq(candidate.as_bytes())
            });
        bool::from(matched)
    }
}

/// API Key 中间件工厂
#[derive(Clone)]
pub struct ApiKeyGuard {
    settings: Arc<ApiKeySettings>,
}

impl ApiKeyGuard {
    pub fn new(settings: ApiKeySettings) -> Self {
        Self {
            settings: Arc::new(settings),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ApiKeyMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyMiddleware {
            service: Rc::new(service),
            settings: self.settings.clone(),
        }))
    }
}

pub struct ApiKeyMiddleware<S> {
    service: Rc<S>,
    settings: Arc<ApiKeySettings>,
}

impl<S> ApiKeyMiddleware<S> {
    fn handle_forbidden<B>(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        info!("Rejected {} {}: invalid or missing API key", req.method(), req.path());
        req.into_response(
            HttpResponse::Forbidden()
                .json(ErrorBody::new("Invalid or missing API key"))
                .map_into_right_body(),
        )
    }
}

impl<S, B> Service<ServiceRequest> for ApiKeyMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let settings = self.settings.clone();

        Box::pin(async move {
            if settings.enforced {
                let provided = req
                    .headers()
                    .get(settings.header.as_str())
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("");
                if !settings.is_valid(provided) {
                    return Ok(Self::handle_forbidden(req));
                }
                trace!("API key accepted");
            }

            let res = srv.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

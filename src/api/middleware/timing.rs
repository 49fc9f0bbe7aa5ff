//! HTTP timing middleware
//!
//! 记录每个请求的耗时与状态码。生成接口可能耗时数分钟，
//! 超过阈值的请求以 warn 级别输出。

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    dev::{ServiceRequest, ServiceResponse},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 慢请求阈值
const SLOW_REQUEST: Duration = Duration::from_secs(120);

/// HTTP timing middleware factory
#[derive(Clone, Default)]
pub struct TimingMiddleware;

impl<S, B> Transform<S, ServiceRequest> for TimingMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TimingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TimingService {
            service: Rc::new(service),
        }))
    }
}

pub struct TimingService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for TimingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
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
        let start = Instant::now();
        let endpoint = classify_endpoint(req.path());

        Box::pin(async move {
            let result = srv.call(req).await;
            let elapsed = start.elapsed();
            let status = match &result {
                Ok(response) => response.status().as_u16(),
                Err(e) => e.as_response_error().status_code().as_u16(),
            };

            if elapsed >= SLOW_REQUEST {
                warn!(endpoint, status, elapsed_ms = elapsed.as_millis() as u64, "Slow request");
            } else if endpoint == "health" {
                debug!(endpoint, status, elapsed_ms = elapsed.as_millis() as u64, "Request finished");
            } else {
                info!(endpoint, status, elapsed_ms = elapsed.as_millis() as u64, "Request finished");
            }

            result
        })
    }
}

/// 按路径归类，避免日志字段取值过多
fn classify_endpoint(path: &str) -> &'static str {
    match path {
        "/generate-ppt" => "generate",
        "/" | "/health" => "health",
        _ => "other",
    }
}

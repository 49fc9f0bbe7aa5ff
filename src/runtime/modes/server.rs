//! Server mode
//!
//! Builds the presentation service and serves the HTTP API until the
//! server exits or Ctrl+C arrives.

use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::api::middleware::{RequestIdMiddleware, TimingMiddleware};
use crate::api::{AppState, configure_app};
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup()
        .await
        .inspect_err(|e| tracing::error!("Server startup failed: {:#}", e))?;

    let config = startup.config;
    let state = AppState::new(&config, startup.service);

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    info!("Using {} worker threads", cpu_count);
    if !state.api_keys.enforced {
        warn!("API key check disabled; /generate-ppt is open to anyone who can reach it");
    }

    let server = HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .configure(move |cfg| configure_app(cfg, state))
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-store")))
            .wrap(Compress::default())
            .wrap(TimingMiddleware)
            // 最后注册的最先执行：耗时日志落在 request span 内
            .wrap(RequestIdMiddleware)
    })
    .keep_alive(Duration::from_secs(30))
    // 生成请求耗时较长，只限制读取请求头的时间
    .client_request_timeout(Duration::from_secs(10))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            warn!("Graceful shutdown: server stopped");
        }
    }

    Ok(())
}

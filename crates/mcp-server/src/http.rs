use std::time::Duration;

use anyhow::{Context as AnyhowContext, Result};
use axum::http::{HeaderName, Method};
use axum::Router;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::StreamableHttpService;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::tools::DropboxService;

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Browser clients may call from any origin, with credentials.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
        .expose_headers([
            HeaderName::from_static("mcp-session-id"),
            HeaderName::from_static("mcp-protocol-version"),
        ])
        .max_age(PREFLIGHT_MAX_AGE)
}

/// Streamable HTTP MCP endpoint mounted at `endpoint`.
pub fn router(service: DropboxService, endpoint: &str) -> Router {
    let mcp = StreamableHttpService::new(
        move || Ok(service.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    Router::new()
        .nest_service(endpoint, mcp)
        .layer(cors_layer())
}

pub async fn serve_http(service: DropboxService, bind: &str, endpoint: &str) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    let local_addr = listener.local_addr()?;
    log::info!("Listening on http://{local_addr}{endpoint}");

    axum::serve(listener, router(service, endpoint))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("Failed to listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}

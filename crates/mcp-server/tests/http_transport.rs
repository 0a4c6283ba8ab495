use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dropbox_extract::ExtractorRegistry;
use dropbox_mcp::http::router;
use dropbox_mcp::DropboxService;
use dropbox_store::{MemoryStore, StoreHandle};
use reqwest::Method;

async fn spawn_server() -> Result<SocketAddr> {
    let service = DropboxService::new(
        StoreHandle::ready(Arc::new(MemoryStore::new())),
        ExtractorRegistry::default(),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router(service, "/mcp")).await;
    });
    Ok(addr)
}

fn header<'a>(response: &'a reqwest::Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

#[tokio::test]
async fn preflight_mirrors_origin_and_allows_credentials() -> Result<()> {
    let addr = spawn_server().await?;
    let response = reqwest::Client::new()
        .request(Method::OPTIONS, format!("http://{addr}/mcp"))
        .header("Origin", "https://playground.example")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type,mcp-session-id")
        .send()
        .await
        .context("preflight request")?;

    assert!(response.status().is_success(), "status {}", response.status());
    assert_eq!(
        header(&response, "access-control-allow-origin"),
        Some("https://playground.example")
    );
    assert_eq!(header(&response, "access-control-allow-credentials"), Some("true"));
    assert_eq!(header(&response, "access-control-max-age"), Some("86400"));
    let methods = header(&response, "access-control-allow-methods").unwrap_or_default();
    for method in ["GET", "POST", "OPTIONS"] {
        assert!(methods.contains(method), "missing {method} in {methods}");
    }
    let allowed = header(&response, "access-control-allow-headers").unwrap_or_default();
    assert!(allowed.contains("mcp-session-id"), "allow-headers: {allowed}");
    Ok(())
}

#[tokio::test]
async fn initialize_opens_a_session_visible_to_browsers() -> Result<()> {
    let addr = spawn_server().await?;
    let initialize = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": { "name": "http-transport-test", "version": "0.0.1" }
        }
    });
    let response = reqwest::Client::new()
        .post(format!("http://{addr}/mcp"))
        .header("Origin", "https://playground.example")
        .header("Accept", "application/json, text/event-stream")
        .json(&initialize)
        .send()
        .await
        .context("initialize request")?;

    assert!(response.status().is_success(), "status {}", response.status());
    assert!(header(&response, "mcp-session-id").is_some());
    let exposed = header(&response, "access-control-expose-headers").unwrap_or_default();
    assert!(exposed.contains("mcp-session-id"), "expose-headers: {exposed}");
    assert!(exposed.contains("mcp-protocol-version"), "expose-headers: {exposed}");
    Ok(())
}

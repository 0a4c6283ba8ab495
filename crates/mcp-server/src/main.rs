use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use dropbox_extract::ExtractorRegistry;
use dropbox_mcp::http::serve_http;
use dropbox_mcp::{Args, DropboxService, ServerConfig, Transport};
use dropbox_store::StoreHandle;
use rmcp::transport::stdio;
use rmcp::ServiceExt;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr only (stdout carries the protocol in stdio mode)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = ServerConfig::from_env()?.with_args(Args::parse())?;
    log::info!("Dropbox MCP Server starting...");
    log::debug!("{config:?}");

    let store = StoreHandle::new(Arc::new(config.connector()));
    if let Err(err) = store.get().await {
        log::warn!("Dropbox client initialization failed: {err}");
        log::warn!("Make sure to set DROPBOX_ACCESS_TOKEN environment variable");
    }

    let service = DropboxService::new(store, ExtractorRegistry::default());
    match config.transport {
        Transport::Http => serve_http(service, &config.bind_addr(), &config.endpoint).await?,
        Transport::Stdio => {
            let server = service.serve(stdio()).await?;
            server.waiting().await?;
        }
    }

    log::info!("Dropbox MCP server stopped");
    Ok(())
}

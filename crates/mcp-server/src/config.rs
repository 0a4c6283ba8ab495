use clap::{Parser, ValueEnum};
use dropbox_store::{DropboxConfig, DropboxConnector, ACCESS_TOKEN_ENV};
use thiserror::Error;

pub const PORT_ENV: &str = "PORT";
pub const HOST_ENV: &str = "HOST";
pub const API_URL_ENV: &str = "DROPBOX_API_URL";
pub const CONTENT_URL_ENV: &str = "DROPBOX_CONTENT_URL";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ENDPOINT: &str = "/mcp";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PORT must be a TCP port number, got {0:?}")]
    InvalidPort(String),

    #[error("endpoint must start with '/', got {0:?}")]
    InvalidEndpoint(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// Streamable HTTP on `--host`/`--port`
    Http,
    /// Newline-delimited JSON-RPC over stdin/stdout
    Stdio,
}

#[derive(Parser, Debug, Default)]
#[command(name = "dropbox-mcp")]
#[command(about = "MCP server for reading and searching Dropbox files", long_about = None)]
#[command(version)]
pub struct Args {
    /// Transport to serve the MCP protocol on
    #[arg(long, value_enum)]
    pub transport: Option<Transport>,

    /// Listen address (falls back to $HOST, then 0.0.0.0)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (falls back to $PORT, then 8080)
    #[arg(long)]
    pub port: Option<u16>,

    /// HTTP path the MCP endpoint is mounted on
    #[arg(long)]
    pub endpoint: Option<String>,
}

/// Process configuration assembled from the environment and command line.
#[derive(Clone)]
pub struct ServerConfig {
    pub transport: Transport,
    pub host: String,
    pub port: u16,
    pub endpoint: String,
    /// Raw credential; validated when the store first connects.
    pub access_token: Option<String>,
    pub dropbox: DropboxConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_blank(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let mut dropbox = DropboxConfig::default();
        if let Some(url) = non_blank(API_URL_ENV) {
            dropbox.api_base_url = url;
        }
        if let Some(url) = non_blank(CONTENT_URL_ENV) {
            dropbox.content_base_url = url;
        }

        Ok(Self {
            transport: Transport::Http,
            host: non_blank(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_token: lookup(ACCESS_TOKEN_ENV),
            dropbox,
        })
    }

    /// Command-line flags win over the environment.
    pub fn with_args(mut self, args: Args) -> Result<Self, ConfigError> {
        if let Some(transport) = args.transport {
            self.transport = transport;
        }
        if let Some(host) = args.host {
            self.host = host;
        }
        if let Some(port) = args.port {
            self.port = port;
        }
        if let Some(endpoint) = args.endpoint {
            if !endpoint.starts_with('/') {
                return Err(ConfigError::InvalidEndpoint(endpoint));
            }
            self.endpoint = endpoint;
        }
        Ok(self)
    }

    pub fn bind_addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn connector(&self) -> DropboxConnector {
        DropboxConnector::new(self.access_token.clone(), self.dropbox.clone())
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("transport", &self.transport)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("endpoint", &self.endpoint)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("dropbox", &self.dropbox)
            .finish()
    }
}

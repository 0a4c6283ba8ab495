use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::dropbox::{DropboxClient, DropboxConfig};
use crate::error::Result;
use crate::remote::RemoteStore;
use crate::token::AccessToken;

/// Produces a ready-to-use store, verifying credentials on the way.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn RemoteStore>>;
}

/// Connects to Dropbox with a bearer token and checks it against the account endpoint.
#[derive(Debug, Clone)]
pub struct DropboxConnector {
    raw_token: Option<String>,
    config: DropboxConfig,
}

impl DropboxConnector {
    pub fn new(raw_token: Option<String>, config: DropboxConfig) -> Self {
        Self { raw_token, config }
    }
}

#[async_trait]
impl Connector for DropboxConnector {
    async fn connect(&self) -> Result<Arc<dyn RemoteStore>> {
        let token = AccessToken::parse(self.raw_token.as_deref())?;
        let client = DropboxClient::new(token, self.config.clone())?;
        let account = client.current_account().await?;
        log::info!(
            "Dropbox client initialized successfully ({})",
            account.name.display_name
        );
        Ok(Arc::new(client))
    }
}

struct ReadyConnector(Arc<dyn RemoteStore>);

#[async_trait]
impl Connector for ReadyConnector {
    async fn connect(&self) -> Result<Arc<dyn RemoteStore>> {
        Ok(self.0.clone())
    }
}

/// Process-wide store slot, connected at most once.
///
/// Concurrent first callers wait on the same connection attempt. A failed attempt leaves the
/// slot empty, so the next caller tries again.
#[derive(Clone)]
pub struct StoreHandle {
    cell: Arc<OnceCell<Arc<dyn RemoteStore>>>,
    connector: Arc<dyn Connector>,
}

impl StoreHandle {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            cell: Arc::new(OnceCell::new()),
            connector,
        }
    }

    /// A handle around an already constructed store.
    pub fn ready(store: Arc<dyn RemoteStore>) -> Self {
        Self::new(Arc::new(ReadyConnector(store)))
    }

    pub async fn get(&self) -> Result<Arc<dyn RemoteStore>> {
        self.cell
            .get_or_try_init(|| self.connector.connect())
            .await
            .cloned()
    }

    pub fn is_connected(&self) -> bool {
        self.cell.initialized()
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("connected", &self.is_connected())
            .finish()
    }
}

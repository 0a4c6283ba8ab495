use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;
use crate::types::{Account, Entry, SpaceUsage};

/// Remote file store capability used by the tool surface.
///
/// Paths are Dropbox-style: `""` is the root, everything else starts with `/`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn current_account(&self) -> Result<Account>;

    /// Entries directly inside `path`, at most `limit` of them.
    async fn list_folder(&self, path: &str, limit: u32) -> Result<Vec<Entry>>;

    async fn download(&self, path: &str) -> Result<Bytes>;

    async fn get_metadata(&self, path: &str) -> Result<Entry>;

    /// Name-based search; results keep the remote ranking.
    async fn search_by_name(&self, query: &str, limit: u32) -> Result<Vec<Entry>>;

    async fn space_usage(&self) -> Result<SpaceUsage>;
}

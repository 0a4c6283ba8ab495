//! Remote store access for the Dropbox MCP server.
//!
//! [`RemoteStore`] is the capability the tool surface depends on. [`DropboxClient`] implements it
//! over the Dropbox HTTP API v2; [`MemoryStore`] implements it in memory for tests and local
//! experiments. [`StoreHandle`] owns the lazily connected store for the lifetime of a process.

mod dropbox;
mod error;
mod filename_search;
mod handle;
mod memory;
mod remote;
mod token;
mod types;

pub use dropbox::{DropboxClient, DropboxConfig, DEFAULT_API_BASE_URL, DEFAULT_CONTENT_BASE_URL};
pub use error::{ErrorKind, Result, StoreError};
pub use filename_search::{search_files, FileTypeFilter, ALL_EXTENSIONS};
pub use handle::{Connector, DropboxConnector, StoreHandle};
pub use memory::MemoryStore;
pub use remote::RemoteStore;
pub use token::{AccessToken, ACCESS_TOKEN_ENV};
pub use types::{
    format_timestamp, Account, AccountName, DeletedMetadata, Entry, FileMetadata, FolderMetadata,
    SpaceAllocation, SpaceUsage,
};

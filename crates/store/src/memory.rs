use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::{Result, StoreError};
use crate::remote::RemoteStore;
use crate::types::{
    Account, AccountName, Entry, FileMetadata, FolderMetadata, SpaceAllocation, SpaceUsage,
};

#[derive(Debug, Clone)]
enum Node {
    File {
        display: String,
        bytes: Bytes,
        modified: DateTime<Utc>,
    },
    Folder {
        display: String,
    },
}

/// In-memory [`RemoteStore`], keyed by lower-cased path like Dropbox itself.
///
/// Adding a file also adds its ancestor folders.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    nodes: BTreeMap<String, Node>,
    account: Account,
}

fn default_modified() -> DateTime<Utc> {
    DateTime::from_timestamp(1_704_067_200, 0).unwrap_or_default()
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn parent_of(path: &str) -> &str {
    path.rfind('/').map_or("", |idx| &path[..idx])
}

fn name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            account: Account {
                account_id: "dbid:memory".to_string(),
                email: "memory@example.com".to_string(),
                name: AccountName {
                    display_name: "Memory Store".to_string(),
                },
            },
        }
    }

    pub fn with_account(mut self, email: &str, display_name: &str) -> Self {
        self.account.email = email.to_string();
        self.account.name.display_name = display_name.to_string();
        self
    }

    pub fn with_file(self, path: &str, bytes: impl Into<Bytes>) -> Self {
        self.with_file_modified(path, bytes, default_modified())
    }

    pub fn with_file_modified(
        mut self,
        path: &str,
        bytes: impl Into<Bytes>,
        modified: DateTime<Utc>,
    ) -> Self {
        let display = normalize(path);
        self.add_ancestors(&display);
        self.nodes.insert(
            display.to_lowercase(),
            Node::File {
                display,
                bytes: bytes.into(),
                modified,
            },
        );
        self
    }

    pub fn with_folder(mut self, path: &str) -> Self {
        let display = normalize(path);
        self.add_ancestors(&display);
        if !display.is_empty() {
            self.nodes
                .insert(display.to_lowercase(), Node::Folder { display });
        }
        self
    }

    fn add_ancestors(&mut self, path: &str) {
        let mut parent = parent_of(path);
        while !parent.is_empty() {
            self.nodes
                .entry(parent.to_lowercase())
                .or_insert_with(|| Node::Folder {
                    display: parent.to_string(),
                });
            parent = parent_of(parent);
        }
    }

    fn entry(key: &str, node: &Node) -> Entry {
        match node {
            Node::File {
                display,
                bytes,
                modified,
            } => Entry::File(FileMetadata {
                name: name_of(display).to_string(),
                id: None,
                path_lower: Some(key.to_string()),
                path_display: Some(display.clone()),
                size: bytes.len() as u64,
                server_modified: *modified,
                client_modified: None,
                rev: None,
            }),
            Node::Folder { display } => Entry::Folder(FolderMetadata {
                name: name_of(display).to_string(),
                id: None,
                path_lower: Some(key.to_string()),
                path_display: Some(display.clone()),
            }),
        }
    }

    fn lookup(&self, endpoint: &str, path: &str) -> Result<(String, &Node)> {
        let key = normalize(path).to_lowercase();
        self.nodes
            .get(&key)
            .map(|node| (key, node))
            .ok_or_else(|| StoreError::not_found(endpoint, path))
    }
}

fn conflict(endpoint: &str, summary: &str) -> StoreError {
    StoreError::Api {
        endpoint: endpoint.to_string(),
        status: 409,
        summary: summary.to_string(),
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn current_account(&self) -> Result<Account> {
        Ok(self.account.clone())
    }

    async fn list_folder(&self, path: &str, limit: u32) -> Result<Vec<Entry>> {
        const ENDPOINT: &str = "files/list_folder";
        let key = normalize(path).to_lowercase();
        if !key.is_empty() {
            let (_, node) = self.lookup(ENDPOINT, path)?;
            if matches!(node, Node::File { .. }) {
                return Err(conflict(ENDPOINT, "path/not_folder/"));
            }
        }

        Ok(self
            .nodes
            .iter()
            .filter(|(child, _)| parent_of(child) == key)
            .take(limit as usize)
            .map(|(child, node)| Self::entry(child, node))
            .collect())
    }

    async fn download(&self, path: &str) -> Result<Bytes> {
        const ENDPOINT: &str = "files/download";
        match self.lookup(ENDPOINT, path)? {
            (_, Node::File { bytes, .. }) => Ok(bytes.clone()),
            (_, Node::Folder { .. }) => Err(conflict(ENDPOINT, "path/not_file/")),
        }
    }

    async fn get_metadata(&self, path: &str) -> Result<Entry> {
        let (key, node) = self.lookup("files/get_metadata", path)?;
        Ok(Self::entry(&key, node))
    }

    async fn search_by_name(&self, query: &str, limit: u32) -> Result<Vec<Entry>> {
        let query = query.to_lowercase();
        Ok(self
            .nodes
            .iter()
            .filter(|(key, _)| name_of(key).contains(&query))
            .take(limit as usize)
            .map(|(key, node)| Self::entry(key, node))
            .collect())
    }

    async fn space_usage(&self) -> Result<SpaceUsage> {
        let used = self
            .nodes
            .values()
            .map(|node| match node {
                Node::File { bytes, .. } => bytes.len() as u64,
                Node::Folder { .. } => 0,
            })
            .sum();
        Ok(SpaceUsage {
            used,
            allocation: Some(SpaceAllocation {
                kind: "individual".to_string(),
                allocated: Some(2 * 1024 * 1024 * 1024),
            }),
        })
    }
}

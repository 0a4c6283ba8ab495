use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::remote::RemoteStore;
use crate::token::AccessToken;
use crate::types::{Account, Entry, SpaceUsage};

pub const DEFAULT_API_BASE_URL: &str = "https://api.dropboxapi.com/2";
pub const DEFAULT_CONTENT_BASE_URL: &str = "https://content.dropboxapi.com/2";

const API_ARG_HEADER: &str = "Dropbox-API-Arg";
const MAX_LIST_LIMIT: u32 = 2_000;
const MAX_SEARCH_RESULTS: u32 = 1_000;

#[derive(Debug, Clone)]
pub struct DropboxConfig {
    /// Base for RPC endpoints (`files/list_folder`, ...).
    pub api_base_url: String,
    /// Base for content-download endpoints (`files/download`).
    pub content_base_url: String,
}

impl Default for DropboxConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            content_base_url: DEFAULT_CONTENT_BASE_URL.to_string(),
        }
    }
}

/// Dropbox HTTP API v2 client.
#[derive(Debug, Clone)]
pub struct DropboxClient {
    http: Client,
    token: AccessToken,
    config: DropboxConfig,
}

#[derive(Serialize)]
struct PathArg<'a> {
    path: &'a str,
}

#[derive(Serialize)]
struct ListFolderArg<'a> {
    path: &'a str,
    limit: u32,
}

#[derive(Serialize)]
struct ListFolderContinueArg<'a> {
    cursor: &'a str,
}

#[derive(Deserialize)]
struct ListFolderResult {
    entries: Vec<Entry>,
    cursor: String,
    has_more: bool,
}

#[derive(Serialize)]
struct SearchV2Arg<'a> {
    query: &'a str,
    options: SearchOptions,
}

#[derive(Serialize)]
struct SearchOptions {
    max_results: u32,
}

#[derive(Deserialize)]
struct SearchV2Result {
    matches: Vec<SearchMatchV2>,
}

#[derive(Deserialize)]
struct SearchMatchV2 {
    metadata: MetadataV2,
}

#[derive(Deserialize)]
#[serde(tag = ".tag", rename_all = "snake_case")]
enum MetadataV2 {
    Metadata {
        metadata: Entry,
    },
    #[serde(other)]
    Other,
}

impl DropboxClient {
    pub fn new(token: AccessToken, config: DropboxConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("dropbox-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            token,
            config,
        })
    }

    fn url(base: &str, endpoint: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), endpoint)
    }

    async fn rpc<A, R>(&self, endpoint: &str, arg: &A) -> Result<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        log::debug!("Dropbox RPC {endpoint}");
        let response = self
            .http
            .post(Self::url(&self.config.api_base_url, endpoint))
            .bearer_auth(self.token.expose())
            .json(arg)
            .send()
            .await?;
        let body = Self::check(endpoint, response).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn check(endpoint: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        let err = StoreError::from_response(endpoint, status.as_u16(), &body, retry_after);
        log::debug!("Dropbox {endpoint} failed: {err}");
        Err(err)
    }
}

/// JSON for the `Dropbox-API-Arg` header: non-ASCII characters escaped as `\uXXXX`.
pub(crate) fn header_safe_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    Ok(out)
}

#[async_trait]
impl RemoteStore for DropboxClient {
    async fn current_account(&self) -> Result<Account> {
        self.rpc("users/get_current_account", &()).await
    }

    async fn list_folder(&self, path: &str, limit: u32) -> Result<Vec<Entry>> {
        let limit = limit.clamp(1, MAX_LIST_LIMIT);
        let mut page: ListFolderResult = self
            .rpc("files/list_folder", &ListFolderArg { path, limit })
            .await?;
        let mut entries = std::mem::take(&mut page.entries);

        while page.has_more && entries.len() < limit as usize {
            page = self
                .rpc(
                    "files/list_folder/continue",
                    &ListFolderContinueArg {
                        cursor: &page.cursor,
                    },
                )
                .await?;
            entries.append(&mut page.entries);
        }

        entries.truncate(limit as usize);
        Ok(entries)
    }

    async fn download(&self, path: &str) -> Result<Bytes> {
        const ENDPOINT: &str = "files/download";
        log::debug!("Dropbox download {path}");
        let response = self
            .http
            .post(Self::url(&self.config.content_base_url, ENDPOINT))
            .bearer_auth(self.token.expose())
            .header(API_ARG_HEADER, header_safe_json(&PathArg { path })?)
            .send()
            .await?;
        Ok(Self::check(ENDPOINT, response).await?.bytes().await?)
    }

    async fn get_metadata(&self, path: &str) -> Result<Entry> {
        self.rpc("files/get_metadata", &PathArg { path }).await
    }

    async fn search_by_name(&self, query: &str, limit: u32) -> Result<Vec<Entry>> {
        let result: SearchV2Result = self
            .rpc(
                "files/search_v2",
                &SearchV2Arg {
                    query,
                    options: SearchOptions {
                        max_results: limit.clamp(1, MAX_SEARCH_RESULTS),
                    },
                },
            )
            .await?;

        Ok(result
            .matches
            .into_iter()
            .filter_map(|m| match m.metadata {
                MetadataV2::Metadata { metadata } => Some(metadata),
                MetadataV2::Other => None,
            })
            .collect())
    }

    async fn space_usage(&self) -> Result<SpaceUsage> {
        self.rpc("users/get_space_usage", &()).await
    }
}

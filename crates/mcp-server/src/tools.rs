//! MCP tools for Dropbox
//!
//! Every tool resolves the remote store through the injected [`StoreHandle`], so the first call
//! after a failed startup connection retries it.

use std::sync::Arc;

use dropbox_extract::ExtractorRegistry;
use dropbox_protocol::{serialize_json_pretty, ContentSearchResult, FileInfo, ReadFileResult};
use dropbox_search::TextQuery;
use dropbox_store::{search_files, Entry, FileTypeFilter, RemoteStore, StoreHandle};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};

use crate::errors::ToolError;

const PREVIEW_SUFFIXES: &[&str] = &[".txt", ".md", ".py", ".js"];
const PREVIEW_CHARS: usize = 200;
const PREVIEW_UNAVAILABLE: &str = "[Could not load preview]";
const MAX_LIST_FILES: u32 = 2_000;

/// Dropbox MCP Service
#[derive(Clone)]
pub struct DropboxService {
    store: StoreHandle,
    extractors: Arc<ExtractorRegistry>,
    tool_router: ToolRouter<Self>,
}

impl DropboxService {
    pub fn new(store: StoreHandle, extractors: ExtractorRegistry) -> Self {
        Self {
            store,
            extractors: Arc::new(extractors),
            tool_router: Self::tool_router(),
        }
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Downloads `path` and extracts its text; placeholders count as failures.
    async fn fetch_text(&self, store: &dyn RemoteStore, path: &str) -> Result<String, ToolError> {
        let bytes = store.download(path).await?;
        Ok(self.extractors.extract(path, &bytes).into_result()?)
    }

    async fn preview(&self, store: &dyn RemoteStore, path: &str) -> String {
        match store.download(path).await {
            Ok(bytes) => {
                let text = self.extractors.extract(path, &bytes).into_text();
                preview_of(&text)
            }
            Err(err) => {
                log::warn!("Could not load preview for {path}: {err}");
                PREVIEW_UNAVAILABLE.to_string()
            }
        }
    }
}

#[tool_handler]
impl ServerHandler for DropboxService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Dropbox File Reader: browse folders with 'list_files', read PDF/DOCX/text files with 'read_file', inspect metadata with 'get_file_info', find files by name with 'search_files', and look for text inside known files with 'search_file_content'. Paths are Dropbox paths such as '/Reports/q3.pdf'; the root folder is ''.".into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Tool Input Schemas
// ============================================================================

fn default_max_files() -> u32 {
    20
}

fn default_max_length() -> usize {
    5_000
}

fn default_file_types() -> String {
    "all".to_string()
}

fn default_max_results() -> usize {
    10
}

fn default_context_chars() -> usize {
    100
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct ListFilesRequest {
    /// Folder to list (default: root)
    #[schemars(description = "Path to the folder (empty string for root)")]
    #[serde(default)]
    pub folder_path: String,

    /// Maximum entries (default: 20)
    #[schemars(description = "Maximum number of items to return")]
    #[serde(default = "default_max_files")]
    pub max_files: u32,
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct ReadFileRequest {
    #[schemars(description = "Full path to the file in Dropbox")]
    pub file_path: String,

    /// Maximum characters returned (default: 5000, 0 = unlimited)
    #[schemars(description = "Maximum characters to return (0 for no limit)")]
    #[serde(default = "default_max_length")]
    pub max_length: usize,
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct FileInfoRequest {
    #[schemars(description = "Full path to the file in Dropbox")]
    pub file_path: String,
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct SearchFilesRequest {
    #[schemars(description = "Search query matched against file names")]
    pub query: String,

    /// Extension filter (default: all)
    #[schemars(
        description = "File types to search: \"all\", \"pdf\", \"docx\", \"txt\", or a comma-separated list of extensions"
    )]
    #[serde(default = "default_file_types")]
    pub file_types: String,

    /// Maximum results (default: 10)
    #[schemars(description = "Maximum number of results to return")]
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct SearchFileContentRequest {
    #[schemars(description = "List of file paths to search in")]
    pub file_paths: Vec<String>,

    #[schemars(description = "Text to search for (case-insensitive)")]
    pub query: String,

    /// Context radius in characters (default: 100)
    #[schemars(description = "Number of characters of context around matches")]
    #[serde(default = "default_context_chars")]
    pub context_chars: usize,
}

// ============================================================================
// Helpers
// ============================================================================

/// Root is `""`; everything else gets a leading `/`.
fn normalize_folder(folder_path: &str) -> String {
    if folder_path.is_empty() || folder_path == "/" {
        String::new()
    } else if folder_path.starts_with('/') {
        folder_path.to_string()
    } else {
        format!("/{folder_path}")
    }
}

fn wants_preview(name: &str) -> bool {
    let name = name.to_lowercase();
    PREVIEW_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

fn preview_of(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Cuts `content` to `max_length` characters; `0` means no limit.
fn truncate_content(file_path: &str, content: String, max_length: usize) -> ReadFileResult {
    let total_chars = content.chars().count();
    let content = if max_length > 0 && total_chars > max_length {
        content.chars().take(max_length).collect()
    } else {
        content
    };
    ReadFileResult {
        file_path: file_path.to_string(),
        truncated: content.chars().count() < total_chars,
        content,
        total_chars,
    }
}

fn render_read(result: &ReadFileResult) -> String {
    if result.truncated {
        format!(
            "{}\n\n[Content truncated - file has {} total characters]",
            result.content, result.total_chars
        )
    } else {
        result.content.clone()
    }
}

fn file_info(entry: &Entry) -> FileInfo {
    match entry {
        Entry::File(meta) => FileInfo {
            name: meta.name.clone(),
            path: meta.path().to_string(),
            size: meta.size,
            modified: meta.modified(),
            is_folder: false,
            content_preview: None,
        },
        Entry::Folder(_) => FileInfo::folder(entry.name(), entry.path()),
        Entry::Deleted(_) => FileInfo {
            is_folder: false,
            ..FileInfo::folder(entry.name(), entry.path())
        },
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serialize_json_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Failed to serialize result: {e}"), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl DropboxService {
    /// List a folder
    #[tool(description = "List files and folders in a Dropbox directory. Text files (.txt, .md, .py, .js) include a short content preview.")]
    pub async fn list_files(
        &self,
        Parameters(request): Parameters<ListFilesRequest>,
    ) -> Result<CallToolResult, McpError> {
        const PREFIX: &str = "Failed to list files: ";
        let folder = normalize_folder(&request.folder_path);
        let limit = request.max_files.clamp(1, MAX_LIST_FILES);

        let store = match self.store.get().await {
            Ok(store) => store,
            Err(e) => return Ok(ToolError::from(e).into_call_result(PREFIX)),
        };
        let entries = match store.list_folder(&folder, limit).await {
            Ok(entries) => entries,
            Err(e) => return Ok(ToolError::from(e).into_call_result(PREFIX)),
        };

        let mut files = Vec::with_capacity(entries.len());
        for entry in &entries {
            match entry {
                Entry::File(meta) => {
                    let mut info = file_info(entry);
                    if wants_preview(&meta.name) && self.extractors.supports(meta.path()) {
                        info.content_preview = Some(self.preview(store.as_ref(), meta.path()).await);
                    }
                    files.push(info);
                }
                Entry::Folder(_) => files.push(file_info(entry)),
                Entry::Deleted(_) => {}
            }
        }

        log::debug!("list_files {folder:?}: {} entries", files.len());
        json_result(&files)
    }

    /// Read a file as text
    #[tool(description = "Read and return the text content of a Dropbox file (PDF, DOCX and plain-text formats). Long content is truncated to max_length characters.")]
    pub async fn read_file(
        &self,
        Parameters(request): Parameters<ReadFileRequest>,
    ) -> Result<CallToolResult, McpError> {
        let prefix = format!("Failed to read file {}: ", request.file_path);

        let store = match self.store.get().await {
            Ok(store) => store,
            Err(e) => return Ok(ToolError::from(e).into_call_result(&prefix)),
        };
        let content = match self.fetch_text(store.as_ref(), &request.file_path).await {
            Ok(content) => content,
            Err(e) => return Ok(e.into_call_result(&prefix)),
        };

        let result = truncate_content(&request.file_path, content, request.max_length);
        log::debug!(
            "read_file {}: {} chars (truncated: {})",
            result.file_path,
            result.total_chars,
            result.truncated
        );
        Ok(CallToolResult::success(vec![Content::text(render_read(&result))]))
    }

    /// File metadata
    #[tool(description = "Get metadata (name, path, size, modification time) for a Dropbox file or folder without downloading it.")]
    pub async fn get_file_info(
        &self,
        Parameters(request): Parameters<FileInfoRequest>,
    ) -> Result<CallToolResult, McpError> {
        let prefix = format!("Failed to get file info for {}: ", request.file_path);

        let store = match self.store.get().await {
            Ok(store) => store,
            Err(e) => return Ok(ToolError::from(e).into_call_result(&prefix)),
        };
        match store.get_metadata(&request.file_path).await {
            Ok(entry) => json_result(&file_info(&entry)),
            Err(e) => Ok(ToolError::from(e).into_call_result(&prefix)),
        }
    }

    /// Filename search
    #[tool(description = "Search for files in Dropbox by name, filtered by file type (\"all\", \"pdf\", \"docx\", \"txt\", or a comma-separated extension list).")]
    pub async fn search_files(
        &self,
        Parameters(request): Parameters<SearchFilesRequest>,
    ) -> Result<CallToolResult, McpError> {
        const PREFIX: &str = "Search failed: ";
        let filter = FileTypeFilter::parse(&request.file_types);

        let store = match self.store.get().await {
            Ok(store) => store,
            Err(e) => return Ok(ToolError::from(e).into_call_result(PREFIX)),
        };
        match search_files(store.as_ref(), &request.query, &filter, request.max_results).await {
            Ok(results) => json_result(&results),
            Err(e) => Ok(ToolError::from(e).into_call_result(PREFIX)),
        }
    }

    /// Text search inside files
    #[tool(description = "Search for text inside specific Dropbox files. Returns every case-insensitive match with its character position, line number and surrounding context. Files that cannot be read are skipped.")]
    pub async fn search_file_content(
        &self,
        Parameters(request): Parameters<SearchFileContentRequest>,
    ) -> Result<CallToolResult, McpError> {
        let query = TextQuery::new(&request.query)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        let store = match self.store.get().await {
            Ok(store) => store,
            Err(e) => return Ok(ToolError::from(e).into_call_result("Search failed: ")),
        };

        let mut results = Vec::new();
        for path in &request.file_paths {
            let text = match self.fetch_text(store.as_ref(), path).await {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Error searching in {path}: {e}");
                    continue;
                }
            };

            let matches = query.find_in(&text, request.context_chars);
            if !matches.is_empty() {
                results.push(ContentSearchResult::new(path.as_str(), matches));
            }
        }

        log::debug!(
            "search_file_content {:?}: {} of {} files matched",
            query.as_str(),
            results.len(),
            request.file_paths.len()
        );
        json_result(&results)
    }
}

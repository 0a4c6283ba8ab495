use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single remote entry (file or folder) as reported to tool callers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct FileInfo {
    pub name: String,
    pub path: String,
    /// Size in bytes; always 0 for folders.
    pub size: u64,
    /// RFC 3339 server modification time; empty for folders.
    pub modified: String,
    pub is_folder: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_preview: Option<String>,
}

impl FileInfo {
    pub fn folder(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            size: 0,
            modified: String::new(),
            is_folder: true,
            content_preview: None,
        }
    }
}

/// Filename search hit.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct SearchResult {
    pub file_path: String,
    pub file_name: String,
    pub match_context: String,
    pub file_size: u64,
    pub modified: String,
}

/// One occurrence of a query inside extracted text.
///
/// `position` and the bounds of `context` are counted in characters, not bytes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ContentMatch {
    pub position: usize,
    pub context: String,
    /// 1-based.
    pub line_number: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ContentSearchResult {
    pub file_path: String,
    pub file_name: String,
    pub matches: Vec<ContentMatch>,
    pub total_matches: usize,
}

impl ContentSearchResult {
    pub fn new(file_path: impl Into<String>, matches: Vec<ContentMatch>) -> Self {
        let file_path = file_path.into();
        let file_name = file_name_of(&file_path).to_string();
        Self {
            file_path,
            file_name,
            total_matches: matches.len(),
            matches,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ReadFileResult {
    pub file_path: String,
    pub content: String,
    pub total_chars: usize,
    pub truncated: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Configuration,
    Authentication,
    RemoteApi,
    Extraction,
    InvalidInput,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Authentication => "authentication",
            Self::RemoteApi => "remote_api",
            Self::Extraction => "extraction",
            Self::InvalidInput => "invalid_input",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let hint = match code {
            ErrorCode::Configuration => Some(
                "Set DROPBOX_ACCESS_TOKEN (see https://www.dropbox.com/developers/apps) and retry."
                    .to_string(),
            ),
            ErrorCode::Authentication => Some(
                "The access token was rejected; generate a new one for the Dropbox app."
                    .to_string(),
            ),
            _ => None,
        };
        Self {
            code,
            message: message.into(),
            hint,
        }
    }
}

/// Last `/`-separated segment of a remote path.
pub fn file_name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

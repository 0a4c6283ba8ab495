//! Dropbox MCP Server
//!
//! Exposes Dropbox file access to AI agents via the MCP protocol.
//!
//! ## Tools
//!
//! - `list_files` - List a folder, with previews for small text formats
//! - `read_file` - Extract the text of a PDF, DOCX or plain-text file
//! - `get_file_info` - Metadata for a single path
//! - `search_files` - Filename search filtered by file type
//! - `search_file_content` - Case-insensitive text search inside given files
//!
//! ## Usage
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "dropbox": {
//!       "command": "dropbox-mcp",
//!       "args": ["--transport", "stdio"],
//!       "env": { "DROPBOX_ACCESS_TOKEN": "sl...." }
//!     }
//!   }
//! }
//! ```

pub mod config;
pub mod errors;
pub mod http;
pub mod tools;

pub use config::{Args, ConfigError, ServerConfig, Transport};
pub use errors::ToolError;
pub use tools::{
    DropboxService, FileInfoRequest, ListFilesRequest, ReadFileRequest, SearchFileContentRequest,
    SearchFilesRequest,
};

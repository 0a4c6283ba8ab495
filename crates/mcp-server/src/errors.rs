use dropbox_extract::ExtractionIssue;
use dropbox_protocol::{serialize_json, ErrorCode, ErrorEnvelope};
use dropbox_store::{ErrorKind, StoreError};
use rmcp::model::{CallToolResult, Content};
use thiserror::Error;

/// Failure of a single tool operation (or of one file within a batch).
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Extraction(#[from] ExtractionIssue),
}

impl ToolError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Store(err) => match err.kind() {
                ErrorKind::Configuration => ErrorCode::Configuration,
                ErrorKind::Authentication => ErrorCode::Authentication,
                ErrorKind::RemoteApi => ErrorCode::RemoteApi,
            },
            Self::Extraction(_) => ErrorCode::Extraction,
        }
    }

    pub fn envelope(&self, prefix: &str) -> ErrorEnvelope {
        ErrorEnvelope::new(self.code(), format!("{prefix}{self}"))
    }

    /// Tool-level error result: the prefixed message first, then the JSON envelope.
    pub fn into_call_result(self, prefix: &str) -> CallToolResult {
        let envelope = self.envelope(prefix);
        log::warn!("{} ({})", envelope.message, envelope.code.as_str());

        let mut content = vec![Content::text(envelope.message.clone())];
        if let Ok(json) = serialize_json(&envelope) {
            content.push(Content::text(json));
        }
        CallToolResult::error(content)
    }
}

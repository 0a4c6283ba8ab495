use thiserror::Error;

/// Why a decoder produced no text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionIssue {
    /// The decoder for this format was not compiled in.
    #[error("{format} text extraction not available in this build")]
    Unavailable { format: &'static str },

    #[error("Error extracting {format} text: {detail}")]
    Failed { format: &'static str, detail: String },

    #[error("Binary file - cannot display as text")]
    Binary,

    #[error("Unsupported file type: {extension}")]
    Unsupported { extension: String },
}

impl ExtractionIssue {
    /// Bracketed form shown in place of document text.
    pub fn placeholder(&self) -> String {
        format!("[{self}]")
    }
}

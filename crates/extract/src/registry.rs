use std::collections::HashMap;
use std::fmt;

use crate::error::ExtractionIssue;
use crate::{docx, pdf, text};

/// Extensions decoded as plain text by the default registry.
pub const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "py", "js", "html", "css", "json", "csv"];

pub type Decoder = fn(&[u8]) -> Extraction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Text(String),
    Placeholder(ExtractionIssue),
}

impl Extraction {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Placeholder(_) => None,
        }
    }

    /// Extracted text, or the issue's placeholder string.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Placeholder(issue) => issue.placeholder(),
        }
    }

    pub fn into_result(self) -> Result<String, ExtractionIssue> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Placeholder(issue) => Err(issue),
        }
    }
}

impl From<ExtractionIssue> for Extraction {
    fn from(issue: ExtractionIssue) -> Self {
        Self::Placeholder(issue)
    }
}

/// Lower-cased extension of the final path segment.
///
/// A name without a dot yields the whole (lower-cased) name, so it shows up verbatim in
/// "unsupported type" messages.
pub fn extension_of(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit('.').next().unwrap_or(name).to_lowercase()
}

/// Extension-keyed decoder table.
#[derive(Clone)]
pub struct ExtractorRegistry {
    decoders: HashMap<String, Decoder>,
}

impl ExtractorRegistry {
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Registers `decoder` for each extension, replacing any previous entry.
    pub fn register(&mut self, extensions: &[&str], decoder: Decoder) -> &mut Self {
        for ext in extensions {
            self.decoders
                .insert(ext.trim_start_matches('.').to_lowercase(), decoder);
        }
        self
    }

    pub fn supports(&self, path: &str) -> bool {
        self.decoders.contains_key(&extension_of(path))
    }

    pub fn extract(&self, path: &str, bytes: &[u8]) -> Extraction {
        let extension = extension_of(path);
        match self.decoders.get(&extension) {
            Some(decoder) => {
                let extraction = decoder(bytes);
                if let Extraction::Placeholder(issue) = &extraction {
                    log::debug!("No text extracted from {path}: {issue}");
                }
                extraction
            }
            None => ExtractionIssue::Unsupported { extension }.into(),
        }
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(&["pdf"], pdf::decode_pdf)
            .register(&["docx", "doc"], docx::decode_docx)
            .register(TEXT_EXTENSIONS, text::decode_text);
        registry
    }
}

impl fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut extensions: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        extensions.sort_unstable();
        f.debug_struct("ExtractorRegistry")
            .field("extensions", &extensions)
            .finish()
    }
}

//! Plain-text extraction for downloaded file bytes.
//!
//! Decoders are looked up by file extension in an [`ExtractorRegistry`]. Every decoder returns
//! an [`Extraction`]: either the extracted text or an [`ExtractionIssue`] describing why no text
//! is available. Callers decide whether an issue is rendered as a placeholder string (previews)
//! or surfaced as a failure (full reads).

mod docx;
mod error;
mod pdf;
mod registry;
mod text;

pub use error::ExtractionIssue;
pub use registry::{extension_of, Decoder, Extraction, ExtractorRegistry, TEXT_EXTENSIONS};

pub use docx::decode_docx;
pub use pdf::decode_pdf;
pub use text::decode_text;

use encoding_rs::{Encoding, WINDOWS_1252};

use crate::registry::Extraction;
use crate::ExtractionIssue;

const BINARY_CHECK_SIZE: usize = 8192;

/// Decodes text files.
///
/// A byte-order mark selects its encoding; otherwise UTF-8 is tried first. Bytes that are not
/// UTF-8 are decoded one byte per character unless they look binary (a NUL in the first 8 KiB).
pub fn decode_text(bytes: &[u8]) -> Extraction {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        if !had_errors {
            return Extraction::Text(text.into_owned());
        }
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Extraction::Text(text.to_string());
    }

    let head = &bytes[..bytes.len().min(BINARY_CHECK_SIZE)];
    if head.contains(&0) {
        return ExtractionIssue::Binary.into();
    }

    let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
    Extraction::Text(text.into_owned())
}

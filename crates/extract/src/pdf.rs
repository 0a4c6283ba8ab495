use crate::registry::Extraction;
#[cfg(not(feature = "pdf"))]
use crate::ExtractionIssue;

/// Page texts joined with newlines, outer whitespace trimmed.
#[cfg(feature = "pdf")]
pub fn decode_pdf(bytes: &[u8]) -> Extraction {
    use crate::ExtractionIssue;

    // pdf-extract panics on some malformed documents.
    match std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes)) {
        Ok(Ok(pages)) => {
            // Pages come back wrapped in blank lines.
            let pages: Vec<&str> = pages
                .iter()
                .map(|page| page.trim_matches(|c: char| c == '\n' || c == '\r'))
                .collect();
            Extraction::Text(pages.join("\n").trim().to_string())
        }
        Ok(Err(err)) => ExtractionIssue::Failed {
            format: "PDF",
            detail: err.to_string(),
        }
        .into(),
        Err(_) => ExtractionIssue::Failed {
            format: "PDF",
            detail: "malformed document".to_string(),
        }
        .into(),
    }
}

#[cfg(not(feature = "pdf"))]
pub fn decode_pdf(_bytes: &[u8]) -> Extraction {
    ExtractionIssue::Unavailable { format: "PDF" }.into()
}

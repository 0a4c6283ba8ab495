use crate::registry::Extraction;
use crate::ExtractionIssue;

/// Paragraph texts from `word/document.xml` joined with newlines, outer whitespace trimmed.
#[cfg(feature = "docx")]
pub fn decode_docx(bytes: &[u8]) -> Extraction {
    match read_paragraphs(bytes) {
        Ok(paragraphs) => Extraction::Text(paragraphs.join("\n").trim().to_string()),
        Err(err) => ExtractionIssue::Failed {
            format: "DOCX",
            detail: err.to_string(),
        }
        .into(),
    }
}

#[cfg(not(feature = "docx"))]
pub fn decode_docx(_bytes: &[u8]) -> Extraction {
    ExtractionIssue::Unavailable { format: "DOCX" }.into()
}

#[cfg(feature = "docx")]
#[derive(thiserror::Error, Debug)]
enum DocxError {
    #[error("not a DOCX archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("malformed document.xml: {0}")]
    Xml(#[from] quick_xml::Error),
}

#[cfg(feature = "docx")]
fn read_paragraphs(bytes: &[u8]) -> Result<Vec<String>, DocxError> {
    use quick_xml::events::Event;
    use quick_xml::Reader;
    use std::io::{Cursor, Read};

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")?
        .read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs = Vec::new();
    // Text boxes nest whole paragraphs inside a paragraph; each level keeps its own buffer.
    let mut open: Vec<String> = Vec::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => open.push(String::new()),
                b"t" => in_text_run = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" => push_text(&mut open, "\t"),
                b"br" | b"cr" => push_text(&mut open, "\n"),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"p" => paragraphs.extend(open.pop()),
                b"t" => in_text_run = false,
                _ => {}
            },
            Event::Text(t) if in_text_run => push_text(&mut open, &t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(feature = "docx")]
fn push_text(open: &mut [String], text: &str) {
    if let Some(paragraph) = open.last_mut() {
        paragraph.push_str(text);
    }
}

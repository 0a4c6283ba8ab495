use crate::error::{Result, SearchError};
use dropbox_protocol::ContentMatch;

/// Lowercases a single character without changing the character count.
///
/// Characters whose lowercase form expands to several characters (e.g. `'İ'`) are kept as-is,
/// so offsets into the folded text always line up with the original text.
pub fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// A validated, pre-folded search query.
#[derive(Debug, Clone)]
pub struct TextQuery {
    original: String,
    folded: Vec<char>,
}

impl TextQuery {
    pub fn new(query: &str) -> Result<Self> {
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(Self {
            original: query.to_string(),
            folded: query.chars().map(fold_char).collect(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Finds every case-insensitive occurrence of the query in `text`.
    ///
    /// Matches are returned in ascending position order. Each context window spans
    /// `context_chars` characters on either side of the match, clipped to the text bounds.
    pub fn find_in(&self, text: &str, context_chars: usize) -> Vec<ContentMatch> {
        let chars: Vec<char> = text.chars().collect();
        let needle = self.folded.as_slice();
        if chars.len() < needle.len() {
            return Vec::new();
        }
        let folded: Vec<char> = chars.iter().copied().map(fold_char).collect();

        let mut matches = Vec::new();
        let mut line_number = 1usize;
        let mut counted_to = 0usize;
        let mut cursor = 0usize;

        while let Some(position) = find_from(&folded, needle, cursor) {
            line_number += chars[counted_to..position]
                .iter()
                .filter(|&&c| c == '\n')
                .count();
            counted_to = position;

            let start = position.saturating_sub(context_chars);
            let end = position
                .saturating_add(needle.len())
                .saturating_add(context_chars)
                .min(chars.len());

            matches.push(ContentMatch {
                position,
                context: chars[start..end].iter().collect(),
                line_number,
            });

            cursor = position + 1;
        }

        matches
    }
}

/// Validates `query` and searches `text` in one call.
pub fn find_matches(text: &str, query: &str, context_chars: usize) -> Result<Vec<ContentMatch>> {
    Ok(TextQuery::new(query)?.find_in(text, context_chars))
}

fn find_from(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| offset + from)
}

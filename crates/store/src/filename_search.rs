use dropbox_protocol::SearchResult;

use crate::error::Result;
use crate::remote::RemoteStore;

/// Extensions searched when the caller asks for `all` file types.
pub const ALL_EXTENSIONS: &[&str] = &[
    ".pdf", ".docx", ".doc", ".txt", ".md", ".py", ".js", ".html", ".css", ".json", ".csv",
];

/// Extension allow-list applied to filename search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTypeFilter {
    extensions: Vec<String>,
}

impl FileTypeFilter {
    /// Parses `all`, `pdf`, `docx`, `txt`, or a comma-separated list such as `md, .py`.
    ///
    /// A blank value means `all`.
    pub fn parse(file_types: &str) -> Self {
        let normalized = file_types.trim().to_lowercase();
        let preset: Option<&[&str]> = match normalized.as_str() {
            "" | "all" => Some(ALL_EXTENSIONS),
            "pdf" => Some(&[".pdf"]),
            "docx" => Some(&[".docx", ".doc"]),
            "txt" => Some(&[".txt", ".md"]),
            _ => None,
        };

        let extensions = match preset {
            Some(list) => list.iter().map(|ext| ext.to_string()).collect(),
            None => normalized
                .split(',')
                .map(|item| item.trim().trim_start_matches('.'))
                .filter(|item| !item.is_empty())
                .map(|item| format!(".{item}"))
                .collect(),
        };
        Self { extensions }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn allows(&self, path: &str) -> bool {
        let path = path.to_lowercase();
        self.extensions.iter().any(|ext| path.ends_with(ext))
    }
}

impl Default for FileTypeFilter {
    fn default() -> Self {
        Self::parse("all")
    }
}

/// Filename search narrowed to the extensions in `filter`.
///
/// Twice `max_results` candidates are requested so that extension filtering still leaves
/// enough hits. Remote ranking is preserved.
pub async fn search_files(
    store: &dyn RemoteStore,
    query: &str,
    filter: &FileTypeFilter,
    max_results: usize,
) -> Result<Vec<SearchResult>> {
    if max_results == 0 {
        return Ok(Vec::new());
    }

    let candidates = u32::try_from(max_results.saturating_mul(2)).unwrap_or(u32::MAX);
    let entries = store.search_by_name(query, candidates).await?;
    log::debug!(
        "Filename search {query:?}: {} candidates before filtering",
        entries.len()
    );

    Ok(entries
        .iter()
        .filter_map(|entry| entry.as_file())
        .filter(|file| filter.allows(file.path()))
        .take(max_results)
        .map(|file| SearchResult {
            file_path: file.path().to_string(),
            file_name: file.name.clone(),
            match_context: format!("Filename match: {}", file.name),
            file_size: file.size,
            modified: file.modified(),
        })
        .collect())
}

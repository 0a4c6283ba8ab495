use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use dropbox_extract::{decode_text, ExtractorRegistry};
use dropbox_mcp::{
    DropboxService, FileInfoRequest, ListFilesRequest, ReadFileRequest, SearchFileContentRequest,
    SearchFilesRequest,
};
use dropbox_protocol::{ContentSearchResult, FileInfo, SearchResult};
use dropbox_store::{
    Account, DropboxConfig, DropboxConnector, Entry, MemoryStore, RemoteStore, SpaceUsage,
    StoreError, StoreHandle,
};
use pretty_assertions::assert_eq;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;

fn service(store: MemoryStore) -> DropboxService {
    DropboxService::new(
        StoreHandle::ready(Arc::new(store)),
        ExtractorRegistry::default(),
    )
}

fn unconfigured_service() -> DropboxService {
    let connector = DropboxConnector::new(None, DropboxConfig::default());
    DropboxService::new(
        StoreHandle::new(Arc::new(connector)),
        ExtractorRegistry::default(),
    )
}

fn text(result: &CallToolResult) -> Result<&str> {
    result
        .content
        .first()
        .and_then(|c| c.as_text())
        .map(|t| t.text.as_str())
        .context("tool result missing text output")
}

fn json<T: serde::de::DeserializeOwned>(result: &CallToolResult) -> Result<T> {
    assert_ne!(result.is_error, Some(true), "tool returned error: {:?}", text(result));
    serde_json::from_str(text(result)?).context("tool output is not the expected JSON")
}

fn fixture() -> MemoryStore {
    MemoryStore::new()
        .with_folder("/Archive")
        .with_file("/Docs/plan.pdf", b"%PDF-1.4 not really".to_vec())
        .with_file("/notes.txt", "n".repeat(250))
        .with_file("/readme.md", "# Quarterly notes\nSee plan.")
        .with_file("/blob.txt", vec![0xff, 0x00, 0x01, 0x02])
}

fn list(folder_path: &str, max_files: u32) -> Parameters<ListFilesRequest> {
    Parameters(ListFilesRequest {
        folder_path: folder_path.to_string(),
        max_files,
    })
}

#[tokio::test]
async fn root_listing_reports_folders_without_size_or_timestamp() -> Result<()> {
    let service = service(fixture());
    let files: Vec<FileInfo> = json(&service.list_files(list("", 20)).await?)?;

    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Archive", "blob.txt", "Docs", "notes.txt", "readme.md"]);

    for folder in files.iter().filter(|f| f.is_folder) {
        assert_eq!(folder.size, 0);
        assert_eq!(folder.modified, "");
        assert_eq!(folder.content_preview, None);
    }
    assert_eq!(files.iter().filter(|f| f.is_folder).count(), 2);
    Ok(())
}

#[tokio::test]
async fn listing_previews_text_files() -> Result<()> {
    let service = service(fixture());
    let files: Vec<FileInfo> = json(&service.list_files(list("/", 20)).await?)?;
    let by_name = |name: &str| files.iter().find(|f| f.name == name).cloned();

    let notes = by_name("notes.txt").context("notes.txt listed")?;
    assert_eq!(notes.size, 250);
    assert_eq!(notes.modified, "2024-01-01T00:00:00Z");
    assert_eq!(notes.content_preview, Some(format!("{}...", "n".repeat(200))));

    let readme = by_name("readme.md").context("readme.md listed")?;
    assert_eq!(
        readme.content_preview.as_deref(),
        Some("# Quarterly notes\nSee plan.")
    );

    let blob = by_name("blob.txt").context("blob.txt listed")?;
    assert_eq!(
        blob.content_preview.as_deref(),
        Some("[Binary file - cannot display as text]")
    );
    Ok(())
}

/// Store whose download of one path fails with a server error.
struct FailingDownload {
    inner: MemoryStore,
    broken: &'static str,
}

#[async_trait]
impl RemoteStore for FailingDownload {
    async fn current_account(&self) -> dropbox_store::Result<Account> {
        self.inner.current_account().await
    }

    async fn list_folder(&self, path: &str, limit: u32) -> dropbox_store::Result<Vec<Entry>> {
        self.inner.list_folder(path, limit).await
    }

    async fn download(&self, path: &str) -> dropbox_store::Result<Bytes> {
        if path.eq_ignore_ascii_case(self.broken) {
            return Err(StoreError::Api {
                endpoint: "files/download".to_string(),
                status: 500,
                summary: "internal_error".to_string(),
            });
        }
        self.inner.download(path).await
    }

    async fn get_metadata(&self, path: &str) -> dropbox_store::Result<Entry> {
        self.inner.get_metadata(path).await
    }

    async fn search_by_name(&self, query: &str, limit: u32) -> dropbox_store::Result<Vec<Entry>> {
        self.inner.search_by_name(query, limit).await
    }

    async fn space_usage(&self) -> dropbox_store::Result<SpaceUsage> {
        self.inner.space_usage().await
    }
}

#[tokio::test]
async fn failed_preview_download_keeps_listing() -> Result<()> {
    let store = FailingDownload {
        inner: fixture(),
        broken: "/notes.txt",
    };
    let service = DropboxService::new(
        StoreHandle::ready(Arc::new(store)),
        ExtractorRegistry::default(),
    );

    let files: Vec<FileInfo> = json(&service.list_files(list("", 20)).await?)?;
    let preview = |name: &str| {
        files
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.content_preview.clone())
    };

    assert_eq!(files.len(), 5);
    assert_eq!(
        preview("notes.txt"),
        Some(Some("[Could not load preview]".to_string()))
    );
    assert_eq!(
        preview("readme.md"),
        Some(Some("# Quarterly notes\nSee plan.".to_string()))
    );
    assert_eq!(preview("Archive"), Some(None));
    Ok(())
}

#[tokio::test]
async fn listing_skips_previews_without_a_decoder() -> Result<()> {
    let mut extractors = ExtractorRegistry::empty();
    extractors.register(&["txt"], decode_text);
    let service = DropboxService::new(StoreHandle::ready(Arc::new(fixture())), extractors);

    let files: Vec<FileInfo> = json(&service.list_files(list("", 20)).await?)?;
    let readme = files
        .iter()
        .find(|f| f.name == "readme.md")
        .context("readme.md listed")?;
    assert_eq!(readme.content_preview, None);

    let notes = files
        .iter()
        .find(|f| f.name == "notes.txt")
        .context("notes.txt listed")?;
    assert_eq!(notes.content_preview, Some(format!("{}...", "n".repeat(200))));
    Ok(())
}

#[tokio::test]
async fn relative_folder_path_is_rooted() -> Result<()> {
    let service = service(fixture());
    let files: Vec<FileInfo> = json(&service.list_files(list("Docs", 20)).await?)?;

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, "/docs/plan.pdf");
    assert_eq!(files[0].content_preview, None);
    Ok(())
}

#[tokio::test]
async fn max_files_limits_listing() -> Result<()> {
    let service = service(fixture());
    let files: Vec<FileInfo> = json(&service.list_files(list("", 2)).await?)?;
    assert_eq!(files.len(), 2);
    Ok(())
}

#[tokio::test]
async fn missing_folder_fails_whole_listing() -> Result<()> {
    let service = service(fixture());
    let result = service.list_files(list("/missing", 20)).await?;

    assert_eq!(result.is_error, Some(true));
    let message = text(&result)?;
    assert!(message.starts_with("Failed to list files: "), "{message}");
    assert!(message.contains("path/not_found/"), "{message}");
    Ok(())
}

#[tokio::test]
async fn read_file_truncates_with_total_character_note() -> Result<()> {
    let service = service(MemoryStore::new().with_file("/fifty.txt", "0123456789".repeat(5)));
    let result = service
        .read_file(Parameters(ReadFileRequest {
            file_path: "/fifty.txt".into(),
            max_length: 10,
        }))
        .await?;

    assert_ne!(result.is_error, Some(true));
    assert_eq!(
        text(&result)?,
        "0123456789\n\n[Content truncated - file has 50 total characters]"
    );
    Ok(())
}

#[tokio::test]
async fn read_file_decodes_single_byte_text() -> Result<()> {
    let service = service(MemoryStore::new().with_file("/menu.txt", b"caf\xe9 cr\xe8me".to_vec()));
    let result = service
        .read_file(Parameters(ReadFileRequest {
            file_path: "/menu.txt".into(),
            max_length: 0,
        }))
        .await?;
    assert_eq!(text(&result)?, "café crème");
    Ok(())
}

#[tokio::test]
async fn read_file_reports_unsupported_types_as_failures() -> Result<()> {
    let service = service(MemoryStore::new().with_file("/data.xlsx", b"PK".to_vec()));
    let result = service
        .read_file(Parameters(ReadFileRequest {
            file_path: "/data.xlsx".into(),
            max_length: 5000,
        }))
        .await?;

    assert_eq!(result.is_error, Some(true));
    assert_eq!(
        text(&result)?,
        "Failed to read file /data.xlsx: Unsupported file type: xlsx"
    );
    Ok(())
}

#[tokio::test]
async fn file_info_for_files_and_folders() -> Result<()> {
    let service = service(fixture());

    let file: FileInfo = json(
        &service
            .get_file_info(Parameters(FileInfoRequest {
                file_path: "/readme.md".into(),
            }))
            .await?,
    )?;
    assert_eq!(file.path, "/readme.md");
    assert_eq!(file.size, 27);
    assert!(!file.is_folder);
    assert_eq!(file.content_preview, None);

    let folder: FileInfo = json(
        &service
            .get_file_info(Parameters(FileInfoRequest {
                file_path: "/Archive".into(),
            }))
            .await?,
    )?;
    assert_eq!(folder, FileInfo::folder("Archive", "/archive"));

    let missing = service
        .get_file_info(Parameters(FileInfoRequest {
            file_path: "/gone.txt".into(),
        }))
        .await?;
    assert!(text(&missing)?.starts_with("Failed to get file info for /gone.txt: "));
    Ok(())
}

#[tokio::test]
async fn docx_search_drops_other_extensions() -> Result<()> {
    let store = MemoryStore::new()
        .with_file("/Contracts/lease.docx", b"docx".to_vec())
        .with_file("/Contracts/lease.pdf", b"pdf".to_vec())
        .with_file("/Contracts/lease-draft.doc", b"doc".to_vec())
        .with_file("/Contracts/lease.txt", b"txt".to_vec());
    let service = service(store);

    let results: Vec<SearchResult> = json(
        &service
            .search_files(Parameters(SearchFilesRequest {
                query: "lease".into(),
                file_types: "docx".into(),
                max_results: 10,
            }))
            .await?,
    )?;

    let names: Vec<_> = results.iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(names, vec!["lease-draft.doc", "lease.docx"]);
    assert!(results
        .iter()
        .all(|r| r.match_context == format!("Filename match: {}", r.file_name)));
    Ok(())
}

#[tokio::test]
async fn content_search_skips_unreadable_paths() -> Result<()> {
    let store = MemoryStore::new()
        .with_file("/logs/a.txt", "Error one\nok\nerror two")
        .with_file("/logs/b.md", "all good")
        .with_file("/logs/bin.txt", vec![0xff, 0x00])
        .with_file("/logs/report.xlsx", b"error".to_vec());
    let service = service(store);

    let results: Vec<ContentSearchResult> = json(
        &service
            .search_file_content(Parameters(SearchFileContentRequest {
                file_paths: vec![
                    "/logs/missing.txt".into(),
                    "/logs/a.txt".into(),
                    "/logs/b.md".into(),
                    "/logs/bin.txt".into(),
                    "/logs/report.xlsx".into(),
                ],
                query: "ERROR".into(),
                context_chars: 3,
            }))
            .await?,
    )?;

    assert_eq!(results.len(), 1);
    let hit = &results[0];
    assert_eq!(hit.file_path, "/logs/a.txt");
    assert_eq!(hit.file_name, "a.txt");
    assert_eq!(hit.total_matches, 2);
    assert_eq!(hit.matches[0].position, 0);
    assert_eq!(hit.matches[0].context, "Error on");
    assert_eq!(hit.matches[1].position, 13);
    assert_eq!(hit.matches[1].line_number, 3);
    assert_eq!(hit.matches[1].context, "ok\nerror tw");
    Ok(())
}

#[tokio::test]
async fn empty_content_query_is_invalid_params() -> Result<()> {
    let service = service(fixture());
    let err = service
        .search_file_content(Parameters(SearchFileContentRequest {
            file_paths: vec!["/readme.md".into()],
            query: String::new(),
            context_chars: 10,
        }))
        .await
        .expect_err("empty query must be rejected");
    assert_eq!(err.code, rmcp::model::ErrorCode::INVALID_PARAMS);
    Ok(())
}

#[tokio::test]
async fn missing_token_surfaces_configuration_error() -> Result<()> {
    let service = unconfigured_service();
    let result = service.list_files(list("", 20)).await?;

    assert_eq!(result.is_error, Some(true));
    assert!(text(&result)?.starts_with(
        "Failed to list files: DROPBOX_ACCESS_TOKEN environment variable is required"
    ));
    let envelope = result
        .content
        .get(1)
        .and_then(|c| c.as_text())
        .map(|t| t.text.clone())
        .context("error envelope")?;
    let envelope: serde_json::Value = serde_json::from_str(&envelope)?;
    assert_eq!(envelope["code"], "configuration");
    assert!(!service.store().is_connected());
    Ok(())
}

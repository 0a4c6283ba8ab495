use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// RFC 3339 with second precision, e.g. `2024-03-01T09:30:00Z`.
pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_lower: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_display: Option<String>,
    pub size: u64,
    pub server_modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_lower: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_lower: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_display: Option<String>,
}

/// A remote entry, tagged the way Dropbox tags metadata (`".tag": "file"` etc.).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = ".tag", rename_all = "snake_case")]
pub enum Entry {
    File(FileMetadata),
    Folder(FolderMetadata),
    Deleted(DeletedMetadata),
}

impl Entry {
    pub fn name(&self) -> &str {
        match self {
            Self::File(m) => &m.name,
            Self::Folder(m) => &m.name,
            Self::Deleted(m) => &m.name,
        }
    }

    /// Lower-cased path, falling back to the display path.
    pub fn path(&self) -> &str {
        let (lower, display) = match self {
            Self::File(m) => (&m.path_lower, &m.path_display),
            Self::Folder(m) => (&m.path_lower, &m.path_display),
            Self::Deleted(m) => (&m.path_lower, &m.path_display),
        };
        lower
            .as_deref()
            .or(display.as_deref())
            .unwrap_or_default()
    }

    pub fn as_file(&self) -> Option<&FileMetadata> {
        match self {
            Self::File(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }
}

impl FileMetadata {
    pub fn path(&self) -> &str {
        self.path_lower
            .as_deref()
            .or(self.path_display.as_deref())
            .unwrap_or_default()
    }

    pub fn modified(&self) -> String {
        format_timestamp(&self.server_modified)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountName {
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    pub email: String,
    pub name: AccountName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceAllocation {
    #[serde(rename = ".tag")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocated: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceUsage {
    pub used: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation: Option<SpaceAllocation>,
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// Coarse failure classes reported to tool callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Authentication,
    RemoteApi,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(
        "DROPBOX_ACCESS_TOKEN environment variable is required. Get your token from https://www.dropbox.com/developers/apps"
    )]
    MissingCredential,

    #[error("Malformed Dropbox access token: {0}")]
    MalformedCredential(String),

    #[error("Invalid Dropbox access token: {0}")]
    Authentication(String),

    #[error("Dropbox API error ({endpoint}, HTTP {status}): {summary}")]
    Api {
        endpoint: String,
        status: u16,
        summary: String,
    },

    #[error("Dropbox rate limit exceeded{}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<u64> },

    #[error("Dropbox request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected Dropbox response: {0}")]
    Decode(#[from] serde_json::Error),
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    retry_after
        .map(|secs| format!(" (retry after {secs}s)"))
        .unwrap_or_default()
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential | Self::MalformedCredential(_) => ErrorKind::Configuration,
            Self::Authentication(_) => ErrorKind::Authentication,
            Self::Api { .. } | Self::RateLimited { .. } | Self::Transport(_) | Self::Decode(_) => {
                ErrorKind::RemoteApi
            }
        }
    }

    /// Builds an error from a non-success Dropbox response.
    pub(crate) fn from_response(
        endpoint: &str,
        status: u16,
        body: &str,
        retry_after: Option<u64>,
    ) -> Self {
        #[derive(serde::Deserialize)]
        struct ErrorBody {
            error_summary: Option<String>,
        }

        let summary = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error_summary)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| Some(body.trim().to_string()).filter(|s| !s.is_empty()))
            .unwrap_or_else(|| format!("HTTP {status}"));

        match status {
            401 => Self::Authentication(summary),
            429 => Self::RateLimited { retry_after },
            _ => Self::Api {
                endpoint: endpoint.to_string(),
                status,
                summary,
            },
        }
    }

    pub(crate) fn not_found(endpoint: &str, path: &str) -> Self {
        Self::Api {
            endpoint: endpoint.to_string(),
            status: 409,
            summary: format!("path/not_found/ ({path})"),
        }
    }
}

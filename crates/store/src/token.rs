use std::fmt;

use crate::error::{Result, StoreError};

pub const ACCESS_TOKEN_ENV: &str = "DROPBOX_ACCESS_TOKEN";

/// A Dropbox OAuth bearer token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
}

impl AccessToken {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let Some(raw) = raw else {
            return Err(StoreError::MissingCredential);
        };

        let token = raw.trim();
        if token.is_empty() {
            return Err(StoreError::MissingCredential);
        }
        if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(StoreError::MalformedCredential(
                "token must not contain whitespace".to_string(),
            ));
        }
        if !token.is_ascii() {
            return Err(StoreError::MalformedCredential(
                "token must be ASCII".to_string(),
            ));
        }

        Ok(Self {
            token: token.to_string(),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::parse(std::env::var(ACCESS_TOKEN_ENV).ok().as_deref())
    }

    pub(crate) fn expose(&self) -> &str {
        &self.token
    }

    /// First 10 and last 4 characters; short tokens are fully hidden.
    pub fn masked(&self) -> String {
        let len = self.token.len();
        if len <= 14 {
            return "*".repeat(len);
        }
        format!("{}...{}", &self.token[..10], &self.token[len - 4..])
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&self.masked()).finish()
    }
}

use std::fmt;
use std::time::Duration;

use reqwest::Url;

pub const BASE_URL_VAR: &str = "VISTAHOST_BASE_URL";
pub const ACCESS_KEY_VAR: &str = "VISTAHOST_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required settings: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid remote base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Remote store address and credentials, fixed for the life of the process.
#[derive(Clone)]
pub struct RemoteConfig {
    base_url: String,
    access_key: String,
    timeout: Duration,
}

impl RemoteConfig {
    /// Every missing setting is reported at once. Blank values count as missing.
    pub fn new(
        base_url: Option<&str>,
        access_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let base_url = base_url.map(normalize_base_url).unwrap_or_default();
        let access_key = access_key.map(str::trim).unwrap_or_default();

        let mut missing = Vec::new();
        if base_url.is_empty() {
            missing.push(BASE_URL_VAR);
        }
        if access_key.is_empty() {
            missing.push(ACCESS_KEY_VAR);
        }
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let parsed = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        Ok(Self {
            base_url: base_url.to_owned(),
            access_key: access_key.to_owned(),
            timeout,
        })
    }

    /// Base address without trailing slashes.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("access_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub fn normalize_base_url(raw: &str) -> &str {
    raw.trim().trim_end_matches('/')
}

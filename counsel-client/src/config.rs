//! Client configuration.

use crate::error::{ClientError, ClientResult};
use counsel_streaming::DEFAULT_MAX_LINE_BYTES;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "COUNSEL_API_BASE";
/// Environment variable overriding the request timeout, in seconds.
pub const ENV_TIMEOUT_SECS: &str = "COUNSEL_TIMEOUT_SECS";
/// Environment variable overriding the default jurisdiction.
pub const ENV_JURISDICTION: &str = "COUNSEL_JURISDICTION";

/// Configuration for the counsel API client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL for the API, without a trailing slash.
    pub base_url: String,
    /// Connect timeout and idle read timeout in seconds. A stream that keeps
    /// delivering bytes is never cut off.
    pub timeout_seconds: u64,
    /// Jurisdiction sent with law questions.
    pub default_jurisdiction: String,
    /// Number of law chunks to retrieve.
    pub default_top_k: u32,
    /// Cap on a single buffered SSE line.
    pub max_line_bytes: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 120,
            default_jurisdiction: "general".to_string(),
            default_top_k: 5,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        }
    }
}

impl ClientConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read overrides from `COUNSEL_API_BASE`, `COUNSEL_TIMEOUT_SECS`, and
    /// `COUNSEL_JURISDICTION`.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL) {
            config = config.with_base_url(&url)?;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout_seconds = secs.trim().parse().map_err(|_| {
                ClientError::configuration(format!("{ENV_TIMEOUT_SECS} must be an integer, got {secs:?}"))
            })?;
        }
        if let Some(jurisdiction) = lookup(ENV_JURISDICTION) {
            config.default_jurisdiction = jurisdiction;
        }

        Ok(config)
    }

    /// Set the base URL. Must be an absolute http(s) URL.
    pub fn with_base_url(mut self, url: &str) -> ClientResult<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| ClientError::configuration(format!("invalid base URL {url:?}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::configuration(format!(
                "base URL must be http or https, got {}",
                parsed.scheme()
            )));
        }
        self.base_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_seconds = timeout.as_secs();
        self
    }

    /// Set the default jurisdiction.
    #[must_use]
    pub fn with_jurisdiction(mut self, jurisdiction: impl Into<String>) -> Self {
        self.default_jurisdiction = jurisdiction.into();
        self
    }

    /// Set the number of law chunks to retrieve.
    #[must_use]
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.default_top_k = top_k;
        self
    }

    /// Set the SSE line cap.
    #[must_use]
    pub fn with_max_line_bytes(mut self, max: usize) -> Self {
        self.max_line_bytes = max;
        self
    }

    /// The request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Full URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of `/api/document/{id}`, with `id` encoded as a single segment.
    pub fn document_url(&self, id: &str) -> ClientResult<Url> {
        let mut url = Url::parse(&self.url("/api/document"))
            .map_err(|e| ClientError::configuration(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::configuration("base URL cannot carry a path"))?
            .push(id);
        Ok(url)
    }
}

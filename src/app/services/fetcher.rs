use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::app::domain::config::GuideConfig;
use crate::app::infrastructure::error::FetchError;

const USER_AGENT: &str = concat!("GuidePad/", env!("CARGO_PKG_VERSION"));

/// Retrieves the markdown behind a language `location`.
/// One call is one attempt: no retry, no cache.
pub trait ContentFetcher {
    fn fetch(&self, location: &str) -> Result<String, FetchError>;
}

/// Where a location points once resolved against the configured host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    Remote(Url),
    Local(PathBuf),
}

/// Fetches over HTTP(S) with minreq, or from disk when no content host is
/// configured.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    base_url: Option<Url>,
    local_root: PathBuf,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    pub fn new(base_url: Option<Url>, local_root: impl Into<PathBuf>) -> Self {
        Self {
            base_url,
            local_root: local_root.into(),
            timeout: None,
        }
    }

    pub fn from_config(config: &GuideConfig) -> Self {
        Self::new(config.content_base(), config.content_root()).with_timeout(Some(config.fetch_timeout()))
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute http(s) and file URLs are used as-is; anything else is joined
    /// onto the content host, or onto the local root without one.
    pub fn resolve_location(&self, location: &str) -> Result<ContentSource, FetchError> {
        let invalid = |reason: String| FetchError::InvalidLocation {
            location: location.to_string(),
            reason,
        };

        if let Ok(url) = Url::parse(location) {
            return match url.scheme() {
                "http" | "https" => Ok(ContentSource::Remote(url)),
                "file" => url
                    .to_file_path()
                    .map(ContentSource::Local)
                    .map_err(|_| invalid("not a local file path".to_string())),
                other => Err(invalid(format!("unsupported scheme '{}'", other))),
            };
        }

        match &self.base_url {
            Some(base) => base
                .join(location)
                .map(ContentSource::Remote)
                .map_err(|e| invalid(e.to_string())),
            None => Ok(ContentSource::Local(
                self.local_root.join(location.trim_start_matches('/')),
            )),
        }
    }

    fn fetch_remote(&self, url: &Url) -> Result<String, FetchError> {
        let mut request = minreq::get(url.as_str()).with_header("User-Agent", USER_AGENT);
        if let Some(timeout) = self.timeout {
            request = request.with_timeout(timeout.as_secs().max(1));
        }

        let response = request
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !(200..300).contains(&response.status_code) {
            return Err(FetchError::Status {
                code: response.status_code,
                reason: response.reason_phrase.clone(),
            });
        }

        response
            .as_str()
            .map(str::to_string)
            .map_err(|e| FetchError::Encoding(e.to_string()))
    }

    fn fetch_local(&self, path: &Path) -> Result<String, FetchError> {
        fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => FetchError::Encoding(path.display().to_string()),
            _ => FetchError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            },
        })
    }
}

impl ContentFetcher for HttpFetcher {
    fn fetch(&self, location: &str) -> Result<String, FetchError> {
        let source = self.resolve_location(location)?;
        info!(?source, "fetching guide content");

        let result = match &source {
            ContentSource::Remote(url) => self.fetch_remote(url),
            ContentSource::Local(path) => self.fetch_local(path),
        };

        if let Ok(text) = &result {
            debug!(bytes = text.len(), "fetched guide content");
        }
        result
    }
}

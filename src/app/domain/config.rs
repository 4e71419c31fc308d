use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;
use url::Url;

use super::catalog::Catalog;
use crate::app::infrastructure::error::{AppError, CatalogError};

pub const DEFAULT_BACKEND_URL: &str = "https://janvi.jarvibeta.xyz";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideConfig {
    /// Host that relative language locations are resolved against. When
    /// unset, locations are read from disk next to the catalog.
    #[serde(default = "default_content_base_url")]
    pub content_base_url: Option<String>,

    /// Replaces the bundled catalog.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Seconds before a fetch or portal call gives up. Every fetch runs on
    /// its own worker thread, so there is no way to turn this off; 0 falls
    /// back to the default.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_portal_url")]
    pub portal_url: String,

    #[serde(default = "default_sidebar_open")]
    pub sidebar_open: bool,
}

fn default_content_base_url() -> Option<String> {
    Some(DEFAULT_BACKEND_URL.to_string())
}

fn default_fetch_timeout_secs() -> u64 {
    15
}

fn default_portal_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_sidebar_open() -> bool {
    true
}

impl Default for GuideConfig {
    fn default() -> Self {
        Self {
            content_base_url: default_content_base_url(),
            catalog_path: None,
            fetch_timeout_secs: default_fetch_timeout_secs(),
            portal_url: default_portal_url(),
            sidebar_open: default_sidebar_open(),
        }
    }
}

impl GuideConfig {
    /// Load config from disk, or create default if not exists
    pub fn load() -> Self {
        Self::load_from(&Self::get_config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse config {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                // File doesn't exist, use defaults
                let default = Self::default();
                // Try to save defaults for next time
                let _ = default.save_to(path);
                default
            }
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::get_config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;

        Ok(())
    }

    /// Get config file path (cross-platform)
    pub fn get_config_path() -> PathBuf {
        let mut path = config_dir();
        path.push("config.json");
        path
    }

    /// Parsed content host, `None` when unset or unparsable.
    pub fn content_base(&self) -> Option<Url> {
        let raw = self.content_base_url.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        match Url::parse(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Ignoring invalid content_base_url '{}': {}", raw, e);
                None
            }
        }
    }

    pub fn portal_base(&self) -> Result<Url, AppError> {
        Url::parse(&self.portal_url)
            .map_err(|e| AppError::Settings(format!("invalid portal_url '{}': {}", self.portal_url, e)))
    }

    pub fn fetch_timeout(&self) -> Duration {
        if self.fetch_timeout_secs == 0 {
            warn!("fetch_timeout_secs must be positive, using {}s", default_fetch_timeout_secs());
            return Duration::from_secs(default_fetch_timeout_secs());
        }
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Directory local locations are read from when no content host is set.
    pub fn content_root(&self) -> PathBuf {
        self.catalog_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// The configured catalog, or the bundled one. Validation problems are
    /// logged, not rejected.
    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        let catalog = match &self.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::bundled()?,
        };
        for problem in catalog.validate() {
            warn!("Catalog problem: {}", problem);
        }
        Ok(catalog)
    }
}

/// Application directory under the platform config dir.
pub fn config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("guidepad");
    path
}

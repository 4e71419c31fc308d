use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Portal error: {0}")]
    Portal(#[from] PortalError),
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure to retrieve the markdown for a language variant.
///
/// Carried across the worker thread inside a `Message`, so it only holds
/// owned strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Failed to fetch markdown: {code} {reason}")]
    Status { code: i32, reason: String },

    #[error("Failed to connect to content host: {0}")]
    Transport(String),

    #[error("Invalid content location {location}: {reason}")]
    InvalidLocation { location: String, reason: String },

    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Content is not valid UTF-8: {0}")]
    Encoding(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    #[error("Failed to verify token: {0}")]
    Status(i32),

    #[error("{0}")]
    Rejected(String),

    #[error("Service temporarily unavailable: {0}")]
    Transport(String),

    #[error("Unexpected response from portal: {0}")]
    Decode(String),

    #[error("Invalid portal URL: {0}")]
    InvalidUrl(String),

    #[error("Not logged in. Run `GuidePad login <FILE>` or pass --discord-id and --username")]
    NotLoggedIn,

    #[error("No verification token. Run `GuidePad token` first")]
    NoToken,
}

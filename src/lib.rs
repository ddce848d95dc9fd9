//! Comic-Sync: a catalog mirror for serialized comics
//!
//! This crate discovers series and issues in a remote comic catalog, works out
//! which issues are missing from the local library, and fetches the missing
//! ones concurrently, assembling each issue's page images into a single PDF.

pub mod catalog;
pub mod config;
pub mod document;
pub mod library;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod select;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Comic-Sync operations
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Failed to decode page {url}: {message}")]
    Decode { url: String, message: String },

    #[error("No usable pages for {}", destination.display())]
    NoContent { destination: PathBuf },

    #[error("No origin URL recorded in {}", series_dir.display())]
    SentinelMissing { series_dir: PathBuf },

    #[error("Storage error: {0}")]
    Storage(#[from] library::StorageError),

    #[error("Document error: {0}")]
    Document(#[from] document::DocumentError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SyncPhase,
        to: state::SyncPhase,
    },

    #[error("Worker failed: {0}")]
    Worker(String),

    #[error("Selection failed: {0}")]
    Selection(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

impl SyncError {
    /// Returns the short reason tag carried by a failed outcome
    pub fn kind(&self) -> state::FailureKind {
        use state::FailureKind;

        match self {
            Self::Config(_) => FailureKind::Config,
            Self::Fetch(_) | Self::HttpClient(_) | Self::UrlParse(_) => FailureKind::Fetch,
            Self::Decode { .. } => FailureKind::Decode,
            Self::NoContent { .. } => FailureKind::NoContent,
            Self::SentinelMissing { .. } => FailureKind::SentinelMissing,
            Self::Storage(_) => FailureKind::Storage,
            Self::Document(_) => FailureKind::Document,
            Self::InvalidTransition { .. } | Self::Worker(_) => FailureKind::Worker,
            Self::Selection(_) => FailureKind::Selection,
        }
    }
}

/// A failed HTTP request
///
/// Non-2xx responses and transport failures are reported the same way so
/// callers only ever deal with one error shape per URL.
#[derive(Debug, Error)]
#[error("Failed to fetch {url}: {cause}")]
pub struct FetchError {
    pub url: String,
    pub cause: FetchCause,
}

impl FetchError {
    pub fn new(url: impl Into<String>, cause: FetchCause) -> Self {
        Self {
            url: url.into(),
            cause,
        }
    }
}

/// Why a fetch failed
#[derive(Debug, Error)]
pub enum FetchCause {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    Transport(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Comic-Sync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{IssueEntry, SeriesEntry, WorkItem};
pub use output::SyncReport;
pub use pipeline::Syncer;
pub use state::{FailureKind, Outcome, SyncPhase};

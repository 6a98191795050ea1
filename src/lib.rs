//! Linkmap: a website crawling and link-cataloging engine
//!
//! This crate crawls a set of starting URLs breadth-first up to a configured
//! depth, recording a deduplicated graph of discovered links (pages, PDFs,
//! Word/Excel documents, broken links) with parent/child relationships, and
//! exports the result as JSON or a markdown report.

pub mod config;
pub mod crawler;
pub mod docparse;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod registry;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for linkmap operations
#[derive(Debug, Error)]
pub enum LinkmapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] registry::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Export serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Job {0} not found")]
    JobNotFound(i64),

    #[error("Job setup failed: {0}")]
    JobSetup(String),
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
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for linkmap operations
pub type Result<T> = std::result::Result<T, LinkmapError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{JobController, JobStatusSnapshot, Orchestrator};
pub use registry::{LinkRegistry, SqliteStore, Store};
pub use state::{JobStatus, LinkType};
pub use url::{normalize_url, SiteFilterSet};

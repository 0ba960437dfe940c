//! Commentary-Harvest: a polite commentary crawler
//!
//! This crate walks a three-level reference site (books, book pages, chapter
//! commentaries), extracts clean text records from each chapter page and
//! writes idempotent SQL statements, one file per book, keyed by
//! deterministic name-derived IDs. Two batch passes run afterwards: one
//! composes the per-book files into a single script, the other recomputes
//! per-book chapter counts from previously exported seed data.

pub mod compose;
pub mod config;
pub mod crawler;
pub mod emit;
pub mod extract;
pub mod identity;
pub mod logging;
pub mod model;
pub mod reconcile;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Commentary-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Extraction error: {0}")]
    Extract(#[from] extract::ExtractError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid crawl phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: crawler::CrawlPhase,
        to: crawler::CrawlPhase,
    },

    #[error("IO error on {path}: {source}")]
    Artifact {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl HarvestError {
    /// Wraps an IO error with the path of the artifact it concerns
    pub fn artifact(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Artifact {
            path: path.into(),
            source,
        }
    }
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

    #[error("Invalid CSS selector in config: {0}")]
    InvalidSelector(String),
}

/// Errors raised at the rendering boundary (navigation or page evaluation)
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("No page has been loaded yet")]
    NoPage,

    #[error("Rendering session is closed")]
    Closed,
}

impl RenderError {
    /// Returns true if another navigation attempt may succeed
    ///
    /// Client errors (4xx) other than 429 are permanent; everything else
    /// is treated as transient.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::NoPage | Self::Closed => false,
        }
    }
}

/// Result type alias for Commentary-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlReport, Crawler};
pub use identity::{assign_id, EntityId, HASH_VERSION};

//! Backlink Scout: internal link discovery for WordPress sites
//!
//! This crate enumerates a site's `wp-sitemap.xml`, fetches every listed page,
//! and scans each page's article content for links to one or more target pages,
//! or for keyword-bearing sentences where a link to a target could be added.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Backlink Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid keyword: {0}")]
    Keyword(#[from] regex::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Errors raised while fetching a single URL
///
/// These never abort a crawl; the caller downgrades them to an empty result
/// or a [`crawler::PageOutcome::FetchError`] for that URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

/// Errors raised while resolving a sitemap
#[derive(Debug, Error)]
pub enum SitemapError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Malformed sitemap XML at {url}: {message}")]
    XmlParse { url: String, message: String },
}

/// Result type alias for Backlink Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlOptions};
pub use crawler::{CrawlResult, MatchCriteria, MatchRecord, PageOutcome};
pub use self::url::{resolve_href, site_root};

//! Configuration module for Backlink Scout
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every field has a default, so a missing file or an
//! empty one yields a usable [`Config`].
//!
//! # Example
//!
//! ```no_run
//! use backlink_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scout.toml")).unwrap();
//! println!("Page concurrency: {}", config.crawler.page_concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlOptions, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default};
pub use validation::validate;

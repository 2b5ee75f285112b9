//! Output handler traits and types
//!
//! This module defines the trait interface for output handlers and the
//! summary counts every crawl reports.

use crate::crawler::CrawlResult;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Summary statistics for a crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    /// Pages handed to the crawl, before de-duplication and the ceiling
    pub pages_found: usize,

    /// Pages scheduled after de-duplication and the ceiling
    pub pages_total: usize,

    /// Pages whose outcome was recorded
    pub pages_processed: usize,

    /// Pages that had an `<article>` container
    pub pages_with_article: usize,

    /// Pages with at least one match
    pub pages_matched: usize,

    /// Match records across all pages and targets
    pub total_matches: usize,

    pub skipped_contains_target: usize,
    pub no_match: usize,
    pub fetch_errors: usize,

    /// Pages abandoned because the crawl deadline elapsed
    pub cancelled: usize,

    pub elapsed: Duration,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Pages dropped by the page ceiling or as duplicates
    pub fn pages_dropped(&self) -> usize {
        self.pages_found.saturating_sub(self.pages_total)
    }

    /// Returns the share of processed pages that were fetched, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.pages_processed == 0 {
            return 0.0;
        }
        ((self.pages_processed - self.fetch_errors) as f64 / self.pages_processed as f64) * 100.0
    }

    /// Returns the share of processed pages that failed to fetch, as a percentage
    pub fn error_rate(&self) -> f64 {
        if self.pages_processed == 0 {
            return 0.0;
        }
        (self.fetch_errors as f64 / self.pages_processed as f64) * 100.0
    }
}

/// Trait for output handlers
///
/// Output handlers consume the aggregated result of a crawl; they never
/// influence what is crawled or matched.
pub trait OutputHandler {
    /// Writes the result and returns the paths of any files produced
    ///
    /// Targets without matches produce no file.
    fn write_result(&self, result: &CrawlResult) -> OutputResult<Vec<PathBuf>>;
}

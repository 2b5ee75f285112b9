//! Output module for crawl results
//!
//! This module handles:
//! - Exporting matches to one CSV file per target
//! - Printing crawl statistics and matches to the console
//!
//! Nothing here feeds back into the crawl.

mod csv_export;
pub mod stats;
mod traits;

pub use csv_export::{
    keyword_report_file_name, link_report_file_name, safe_target_name, write_keyword_report,
    write_link_report, CsvOutputHandler,
};
pub use stats::{print_matches, print_summary};
pub use traits::{CrawlSummary, OutputError, OutputHandler, OutputResult};

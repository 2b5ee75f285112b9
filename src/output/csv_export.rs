//! CSV report generation
//!
//! One file is written per target that has matches:
//! - Link mode: `internal_links_{name}_{count}_found.csv` with the columns
//!   `Source URL, Anchor Text, Target URL`
//! - Keyword mode: `keyword_matches_{name}.csv` with the columns
//!   `URL, Keyword, Sentence 1..N`, one row per page and keyword

use crate::crawler::{CrawlResult, KeywordMatch, LinkMatch, MatchRecord};
use crate::output::traits::{OutputHandler, OutputResult};
use std::path::{Path, PathBuf};
use url::Url;

/// Writes CSV reports into a directory
pub struct CsvOutputHandler {
    directory: PathBuf,
}

impl CsvOutputHandler {
    /// Creates a handler writing into `directory`, which is created if missing
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl OutputHandler for CsvOutputHandler {
    fn write_result(&self, result: &CrawlResult) -> OutputResult<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.directory)?;

        let mut written = Vec::new();

        for (target, records) in &result.matches {
            if records.is_empty() {
                tracing::warn!("No matches found for: {}", target);
                continue;
            }

            let links: Vec<&LinkMatch> = records
                .iter()
                .filter_map(|r| match r {
                    MatchRecord::Link(l) => Some(l),
                    MatchRecord::Keyword(_) => None,
                })
                .collect();
            let keywords: Vec<&KeywordMatch> = records
                .iter()
                .filter_map(|r| match r {
                    MatchRecord::Keyword(k) => Some(k),
                    MatchRecord::Link(_) => None,
                })
                .collect();

            if !links.is_empty() {
                let path = self
                    .directory
                    .join(link_report_file_name(target, links.len()));
                write_link_report(&path, target, &links)?;
                tracing::info!("Saved {} links for {} to {}", links.len(), target, path.display());
                written.push(path);
            }

            if !keywords.is_empty() {
                let path = self.directory.join(keyword_report_file_name(target));
                write_keyword_report(&path, &keywords)?;
                tracing::info!(
                    "Saved keyword matches from {} pages for {} to {}",
                    keywords.len(),
                    target,
                    path.display()
                );
                written.push(path);
            }
        }

        Ok(written)
    }
}

/// Derives a filesystem-safe name from a target URL's path and query
///
/// Path separators and query delimiters become underscores, surrounding
/// underscores are trimmed, and an empty result becomes `homepage`.
///
/// # Examples
///
/// ```
/// use backlink_scout::output::safe_target_name;
///
/// assert_eq!(safe_target_name("https://example.com/blog/my-post/"), "blog_my-post");
/// assert_eq!(safe_target_name("https://example.com/"), "homepage");
/// ```
pub fn safe_target_name(target: &str) -> String {
    let raw = match Url::parse(target) {
        Ok(url) => match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        },
        Err(_) => target.to_string(),
    };

    let replaced: String = raw
        .chars()
        .map(|c| match c {
            '/' | '?' | '&' | '=' | '\\' | ':' => '_',
            other => other,
        })
        .collect();

    let trimmed = replaced.trim_matches('_');
    if trimmed.is_empty() {
        "homepage".to_string()
    } else {
        trimmed.to_string()
    }
}

/// File name of the link-mode report for `target`
pub fn link_report_file_name(target: &str, count: usize) -> String {
    format!("internal_links_{}_{}_found.csv", safe_target_name(target), count)
}

/// File name of the keyword-mode report for `target`
pub fn keyword_report_file_name(target: &str) -> String {
    format!("keyword_matches_{}.csv", safe_target_name(target))
}

/// Writes `Source URL, Anchor Text, Target URL` rows
pub fn write_link_report(path: &Path, target: &str, links: &[&LinkMatch]) -> OutputResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["Source URL", "Anchor Text", "Target URL"])?;

    for link in links {
        writer.write_record([link.source.as_str(), link.anchor_text.as_str(), target])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes `URL, Keyword, Sentence 1..N` rows
///
/// N is the longest sentence list; shorter rows are padded with empty cells.
pub fn write_keyword_report(path: &Path, matches: &[&KeywordMatch]) -> OutputResult<()> {
    let width = matches
        .iter()
        .flat_map(|m| m.keywords.iter())
        .map(|k| k.sentences.len())
        .max()
        .unwrap_or(0);

    let mut writer = csv::Writer::from_path(path)?;

    let mut header = vec!["URL".to_string(), "Keyword".to_string()];
    header.extend((1..=width).map(|i| format!("Sentence {}", i)));
    writer.write_record(&header)?;

    for found in matches {
        for keyword in &found.keywords {
            if keyword.sentences.is_empty() {
                continue;
            }

            let mut row = vec![found.source.clone(), keyword.keyword.clone()];
            row.extend(keyword.sentences.iter().cloned());
            row.resize(width + 2, String::new());
            writer.write_record(&row)?;
        }
    }

    writer.flush()?;
    Ok(())
}

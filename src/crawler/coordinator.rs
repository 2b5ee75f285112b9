//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Preparing the page list (target exclusion, de-duplication, page ceiling)
//! - Fanning the page matcher out under a concurrency cap
//! - Merging per-page outcomes into the per-target result
//! - Progress and summary reporting

use crate::config::{Config, CrawlOptions};
use crate::crawler::matcher::{match_page, MatchCriteria, MatchRecord, PageOutcome};
use crate::crawler::sitemap::resolve_site_urls;
use crate::crawler::build_http_client;
use crate::output::CrawlSummary;
use crate::url::site_roots;
use crate::ScoutError;
use crate::FetchError;
use reqwest::Client;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// Aggregated matches of one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlResult {
    /// Target URL -> matches in completion order
    ///
    /// In link mode every target has an entry, possibly empty.
    pub matches: BTreeMap<String, Vec<MatchRecord>>,

    /// Counts describing the crawl
    pub summary: CrawlSummary,
}

impl CrawlResult {
    /// Total number of match records across all targets
    pub fn total_matches(&self) -> usize {
        self.matches.values().map(Vec::len).sum()
    }

    /// True when no target has any match
    pub fn is_empty(&self) -> bool {
        self.total_matches() == 0
    }
}

/// Main crawler coordinator structure
///
/// Holds the shared HTTP client and the crawl options. The client is never
/// mutated after construction and is shared by every in-flight fetch.
pub struct Coordinator {
    client: Client,
    options: CrawlOptions,
}

impl Coordinator {
    /// Creates a new coordinator, building the HTTP client from `config`
    pub fn new(config: &Config) -> Result<Self, ScoutError> {
        let client = build_http_client(&config.user_agent, &config.crawler)?;
        Ok(Self::with_client(client, config.crawler.clone()))
    }

    /// Creates a coordinator around an existing client
    pub fn with_client(client: Client, options: CrawlOptions) -> Self {
        Self { client, options }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.options
    }

    /// Discovers the candidate pages for `criteria`
    ///
    /// Site roots are derived from the target URLs, their sitemaps are
    /// resolved, and the targets themselves are removed from the result.
    pub async fn discover_pages(&self, criteria: &MatchCriteria) -> Vec<String> {
        let targets = criteria.targets();
        let roots = site_roots(&targets);

        if roots.is_empty() {
            tracing::error!("No valid URLs provided");
            return Vec::new();
        }

        tracing::info!("Processing {} site(s): {}", roots.len(), roots.join(", "));

        let pages =
            resolve_site_urls(&self.client, &roots, self.options.sitemap_concurrency).await;
        exclude_targets(pages, criteria)
    }

    /// Runs the page matcher over `pages` and aggregates the matches
    ///
    /// Pages are de-duplicated and capped at `max_pages` first. Each page runs
    /// on its own spawned task, at most `page_concurrency` at a time, so HTML
    /// parsing uses every runtime worker. Outcomes are merged on this task as
    /// they complete and no state is shared between workers. Without a
    /// deadline the call returns only once every page has been classified.
    pub async fn crawl(&self, pages: Vec<String>, criteria: &MatchCriteria) -> CrawlResult {
        let found = pages.len();
        let pages = apply_page_ceiling(dedup_pages(pages), self.options.max_pages);

        let mut result = CrawlResult::default();
        if let MatchCriteria::Links { targets } = criteria {
            for target in targets {
                result.matches.entry(target.clone()).or_default();
            }
        }

        let summary = &mut result.summary;
        summary.pages_found = found;
        summary.pages_total = pages.len();

        let total = pages.len();
        tracing::info!(
            "Starting {} crawl of {} pages...",
            criteria.mode_name(),
            total
        );

        let start_time = Instant::now();
        let deadline = self
            .options
            .crawl_deadline()
            .map(|budget| tokio::time::Instant::now() + budget);

        let concurrency = self.options.page_concurrency.max(1);
        let criteria = Arc::new(criteria.clone());
        let mut queue = pages.into_iter();
        let mut in_flight: JoinSet<(String, PageOutcome)> = JoinSet::new();

        loop {
            while in_flight.len() < concurrency {
                let url = match queue.next() {
                    Some(url) => url,
                    None => break,
                };
                let client = self.client.clone();
                let criteria = Arc::clone(&criteria);
                in_flight.spawn(async move {
                    let outcome = match_page(&client, &url, &criteria).await;
                    (url, outcome)
                });
            }

            let next = match deadline {
                Some(at) => match tokio::time::timeout_at(at, in_flight.join_next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        let remaining = total - result.summary.pages_processed;
                        tracing::warn!(
                            "Crawl deadline reached; cancelling {} unfinished pages",
                            remaining
                        );
                        in_flight.abort_all();
                        result.summary.cancelled = remaining;
                        break;
                    }
                },
                None => in_flight.join_next().await,
            };

            let (url, outcome) = match next {
                Some(Ok(item)) => item,
                Some(Err(e)) => {
                    tracing::error!("Page task failed: {}", e);
                    (
                        String::new(),
                        PageOutcome::FetchError(FetchError::Network {
                            url: String::new(),
                            message: e.to_string(),
                        }),
                    )
                }
                None => break,
            };

            record_outcome(&mut result, &url, outcome);

            let processed = result.summary.pages_processed;
            if processed % 50 == 0 || processed == total {
                let elapsed = start_time.elapsed().as_secs_f64();
                let rate = if elapsed > 0.0 {
                    processed as f64 / elapsed
                } else {
                    0.0
                };
                let eta = if rate > 0.0 {
                    (total - processed) as f64 / rate
                } else {
                    0.0
                };
                tracing::info!(
                    "Progress: {}/{} pages ({:.1}%) | Matches: {} | ETA: {:.0}s",
                    processed,
                    total,
                    processed as f64 / total as f64 * 100.0,
                    result.summary.total_matches,
                    eta
                );
            }
        }

        result.summary.elapsed = start_time.elapsed();

        tracing::info!(
            "Crawl complete in {:.1} seconds",
            result.summary.elapsed.as_secs_f64()
        );
        tracing::info!(
            "Pages with <article> tag: {}/{}",
            result.summary.pages_with_article,
            total
        );
        tracing::info!(
            "Total matches: {} | Skipped (contains target link): {} | No match: {} | Errors: {}",
            result.summary.total_matches,
            result.summary.skipped_contains_target,
            result.summary.no_match,
            result.summary.fetch_errors
        );

        result
    }
}

/// Merges one page outcome into the result and its summary
fn record_outcome(result: &mut CrawlResult, url: &str, outcome: PageOutcome) {
    let summary = &mut result.summary;
    summary.pages_processed += 1;
    if outcome.article_found() {
        summary.pages_with_article += 1;
    }

    match outcome {
        PageOutcome::Matched(matches) => {
            summary.pages_matched += 1;
            summary.total_matches += matches.len();

            for found in matches {
                if let MatchRecord::Link(link) = &found.record {
                    tracing::info!("Found link! '{}' -> {}", link.anchor_text, found.target);
                } else {
                    tracing::info!("Keywords found in URL: {}", url);
                }
                result
                    .matches
                    .entry(found.target)
                    .or_default()
                    .push(found.record);
            }
        }
        PageOutcome::SkippedContainsTarget => summary.skipped_contains_target += 1,
        PageOutcome::NoMatch { .. } => summary.no_match += 1,
        PageOutcome::FetchError(e) => {
            tracing::debug!("Failed to fetch or search page {}: {}", url, e);
            summary.fetch_errors += 1;
        }
    }
}

/// Removes the target URLs from the candidate pages
///
/// A target page is never checked against itself.
pub fn exclude_targets(pages: Vec<String>, criteria: &MatchCriteria) -> Vec<String> {
    let targets: HashSet<&str> = criteria.targets().into_iter().collect();
    pages
        .into_iter()
        .filter(|page| !targets.contains(page.as_str()))
        .collect()
}

/// Drops repeated page URLs, keeping the first occurrence of each
pub fn dedup_pages(pages: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    pages
        .into_iter()
        .filter(|page| seen.insert(page.clone()))
        .collect()
}

/// Truncates `pages` to the first `max_pages` entries, warning if any are dropped
pub fn apply_page_ceiling(mut pages: Vec<String>, max_pages: usize) -> Vec<String> {
    if pages.len() > max_pages {
        tracing::warn!(
            "Limiting crawl to {} pages (found {} total, {} dropped)",
            max_pages,
            pages.len(),
            pages.len() - max_pages
        );
        pages.truncate(max_pages);
    }
    pages
}

/// Runs a complete search: sitemap discovery followed by the page crawl
///
/// # Arguments
///
/// * `config` - The configuration
/// * `criteria` - Targets and, in keyword mode, keywords
///
/// # Returns
///
/// * `Ok(CrawlResult)` - The crawl completed (the result may be empty)
/// * `Err(ScoutError)` - The HTTP client could not be built
///
/// # Example
///
/// ```no_run
/// use backlink_scout::config::Config;
/// use backlink_scout::crawler::{run_crawl, MatchCriteria};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let criteria = MatchCriteria::links(["https://example.com/target/"]);
/// let result = run_crawl(&Config::default(), &criteria).await?;
/// println!("{} matches", result.total_matches());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config, criteria: &MatchCriteria) -> Result<CrawlResult, ScoutError> {
    let coordinator = Coordinator::new(config)?;

    let pages = coordinator.discover_pages(criteria).await;
    if pages.is_empty() {
        tracing::error!("No pages found to crawl");
    }

    Ok(coordinator.crawl(pages, criteria).await)
}

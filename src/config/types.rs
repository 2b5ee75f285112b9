use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Backlink Scout
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlOptions,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Tuning knobs for sitemap resolution and the page crawl
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlOptions {
    /// Maximum number of sub-sitemap fetches in flight
    #[serde(rename = "sitemap-concurrency")]
    pub sitemap_concurrency: usize,

    /// Maximum number of page fetches in flight
    #[serde(rename = "page-concurrency")]
    pub page_concurrency: usize,

    /// Hard ceiling on the number of pages matched per crawl
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Optional wall-clock budget for the whole page crawl (seconds)
    #[serde(rename = "crawl-deadline-secs")]
    pub crawl_deadline_secs: Option<u64>,
}

impl CrawlOptions {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn crawl_deadline(&self) -> Option<Duration> {
        self.crawl_deadline_secs.map(Duration::from_secs)
    }
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            sitemap_concurrency: 10,
            page_concurrency: 20,
            max_pages: 1000,
            request_timeout_secs: 10,
            crawl_deadline_secs: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value (`name/version`)
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the CSV reports are written into
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
        }
    }
}

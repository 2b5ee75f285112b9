//! Crawler module: sitemap discovery and the crawl-and-match engine
//!
//! This module contains the core logic, including:
//! - HTTP fetching with a shared, connection-pooling client
//! - WordPress sitemap index and sub-sitemap resolution
//! - Article extraction and link/keyword matching per page
//! - Bounded-concurrency crawl coordination and aggregation

mod coordinator;
mod fetcher;
mod keywords;
mod matcher;
mod parser;
mod sitemap;

pub use coordinator::{
    apply_page_ceiling, dedup_pages, exclude_targets, run_crawl, Coordinator, CrawlResult,
};
pub use fetcher::{build_http_client, fetch_text};
pub use keywords::{find_keyword_sentences, parse_keyword_list, KeywordPattern, KeywordSentences};
pub use matcher::{
    evaluate_page, match_page, KeywordMatch, LinkMatch, MatchCriteria, MatchRecord, PageOutcome,
    TargetMatch,
};
pub use parser::{parse_article, ArticleLink, ParsedArticle};
pub use sitemap::{
    fetch_sitemap_index, fetch_sitemap_pages, parse_sitemap_index, parse_url_set,
    resolve_site_urls, sitemap_index_url, SITEMAP_INDEX_PATH, SITEMAP_NAMESPACE,
};

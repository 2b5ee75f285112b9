//! WordPress sitemap resolution
//!
//! A WordPress site publishes a sitemap index at `/wp-sitemap.xml` that lists
//! one sub-sitemap per post type or taxonomy. Each sub-sitemap is a regular
//! `<urlset>` of page locations. This module flattens both levels into the
//! list of page URLs to crawl.

use crate::crawler::fetcher::fetch_text;
use crate::SitemapError;
use futures::stream::{self, StreamExt};
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use reqwest::Client;

/// Namespace every sitemap element must be bound to
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Well-known path of the WordPress sitemap index
pub const SITEMAP_INDEX_PATH: &str = "/wp-sitemap.xml";

/// Child element of `<sitemapindex>` that carries a sub-sitemap location
const INDEX_ENTRY: &str = "sitemap";

/// Child element of `<urlset>` that carries a page location
const URLSET_ENTRY: &str = "url";

/// Returns the sitemap index location for a site root
///
/// # Examples
///
/// ```
/// use backlink_scout::crawler::sitemap_index_url;
///
/// assert_eq!(
///     sitemap_index_url("https://example.com"),
///     "https://example.com/wp-sitemap.xml"
/// );
/// ```
pub fn sitemap_index_url(site_root: &str) -> String {
    format!("{}{}", site_root.trim_end_matches('/'), SITEMAP_INDEX_PATH)
}

/// Parses a sitemap index and returns every `<sitemap><loc>` value
pub fn parse_sitemap_index(xml: &str) -> Result<Vec<String>, String> {
    parse_locs(xml, INDEX_ENTRY)
}

/// Parses a sitemap URL set and returns every `<url><loc>` value
pub fn parse_url_set(xml: &str) -> Result<Vec<String>, String> {
    parse_locs(xml, URLSET_ENTRY)
}

/// Collects the text of `<loc>` elements that sit directly under an `entry`
/// element which itself is a direct child of the document root
///
/// Elements outside the sitemap namespace are ignored, so a document without
/// the namespace yields an empty list rather than an error. Malformed XML
/// (mismatched or unclosed tags, no root element) is an error.
fn parse_locs(xml: &str, entry: &str) -> Result<Vec<String>, String> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let namespace = Namespace(SITEMAP_NAMESPACE.as_bytes());

    // (bound to the sitemap namespace, local name) for every open element
    let mut stack: Vec<(bool, String)> = Vec::new();
    let mut saw_root = false;
    let mut current_loc: Option<String> = None;
    let mut locs = Vec::new();

    loop {
        match reader.read_resolved_event() {
            Ok((ns, Event::Start(e))) => {
                let in_namespace = matches!(ns, ResolveResult::Bound(n) if n == namespace);
                let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                saw_root = true;
                stack.push((in_namespace, local));

                if is_loc_path(&stack, entry) {
                    current_loc = Some(String::new());
                }
            }
            Ok((_, Event::Empty(_))) => {
                saw_root = true;
            }
            Ok((_, Event::Text(e))) => {
                if let Some(loc) = current_loc.as_mut() {
                    let text = e.unescape().map_err(|e| e.to_string())?;
                    loc.push_str(&text);
                }
            }
            Ok((_, Event::CData(e))) => {
                if let Some(loc) = current_loc.as_mut() {
                    loc.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok((_, Event::End(_))) => {
                if is_loc_path(&stack, entry) {
                    if let Some(loc) = current_loc.take() {
                        let loc = loc.trim();
                        if !loc.is_empty() {
                            locs.push(loc.to_string());
                        }
                    }
                }
                stack.pop();
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(e) => return Err(format!("XML error: {}", e)),
        }
    }

    if !saw_root {
        return Err("no root element found".to_string());
    }

    if let Some((_, name)) = stack.last() {
        return Err(format!("unclosed element <{}>", name));
    }

    Ok(locs)
}

/// True when the open-element stack is exactly `root > entry > loc`
fn is_loc_path(stack: &[(bool, String)], entry: &str) -> bool {
    stack.len() == 3
        && stack[1].0
        && stack[1].1 == entry
        && stack[2].0
        && stack[2].1 == "loc"
}

/// Fetches a sitemap document and extracts the `<loc>` values of `entry` elements
async fn fetch_locs(client: &Client, url: &str, entry: &str) -> Result<Vec<String>, SitemapError> {
    let body = fetch_text(client, url).await?;
    parse_locs(&body, entry).map_err(|message| SitemapError::XmlParse {
        url: url.to_string(),
        message,
    })
}

/// Fetches the sitemap index of a site and returns its sub-sitemap locations
///
/// Any failure is logged and yields an empty list; it never affects other sites.
pub async fn fetch_sitemap_index(client: &Client, site_root: &str) -> Vec<String> {
    let index_url = sitemap_index_url(site_root);
    tracing::info!("Fetching sitemap index: {}", index_url);

    match fetch_locs(client, &index_url, INDEX_ENTRY).await {
        Ok(sitemaps) => {
            tracing::info!("Found {} sitemaps in index {}", sitemaps.len(), index_url);
            sitemaps
        }
        Err(SitemapError::XmlParse { message, .. }) => {
            tracing::error!(
                "Failed to parse sitemap XML at {} - may not be a WordPress site: {}",
                index_url,
                message
            );
            Vec::new()
        }
        Err(e) => {
            tracing::error!("Failed to fetch sitemap index: {}", e);
            Vec::new()
        }
    }
}

/// Fetches every sub-sitemap concurrently and concatenates their page URLs
///
/// At most `concurrency` sub-sitemaps are in flight at once. A sub-sitemap that
/// fails contributes nothing. Duplicates are kept; the order across
/// sub-sitemaps follows completion order.
pub async fn fetch_sitemap_pages(
    client: &Client,
    sitemap_urls: &[String],
    concurrency: usize,
) -> Vec<String> {
    let total = sitemap_urls.len();
    tracing::info!("Fetching URLs from {} sitemaps...", total);

    let mut results = stream::iter(sitemap_urls)
        .map(|url| async move { (url, fetch_locs(client, url, URLSET_ENTRY).await) })
        .buffer_unordered(concurrency.max(1));

    let mut page_urls = Vec::new();
    let mut completed = 0;

    while let Some((url, result)) = results.next().await {
        completed += 1;

        match result {
            Ok(urls) => {
                tracing::debug!("Sitemap {} listed {} URLs", url, urls.len());
                page_urls.extend(urls);
            }
            Err(e) => tracing::warn!("Failed to fetch or parse sitemap {}: {}", url, e),
        }

        if completed % 5 == 0 || completed == total {
            tracing::info!(
                "Processed {}/{} sitemaps ({} URLs so far)",
                completed,
                total,
                page_urls.len()
            );
        }
    }

    tracing::info!("Total URLs collected: {}", page_urls.len());
    page_urls
}

/// Resolves the page URLs of one or more sites
///
/// Each site's index is fetched in turn, then all sub-sitemaps of all sites are
/// fetched through one bounded pool.
///
/// # Arguments
///
/// * `client` - The shared HTTP client
/// * `site_roots` - Site roots such as `https://example.com`
/// * `concurrency` - Maximum number of sub-sitemap fetches in flight
pub async fn resolve_site_urls(
    client: &Client,
    site_roots: &[String],
    concurrency: usize,
) -> Vec<String> {
    let mut sitemap_urls = Vec::new();
    for root in site_roots {
        sitemap_urls.extend(fetch_sitemap_index(client, root).await);
    }

    if sitemap_urls.is_empty() {
        tracing::error!("No sitemaps found. Make sure the site uses WordPress (wp-sitemap.xml)");
        return Vec::new();
    }

    fetch_sitemap_pages(client, &sitemap_urls, concurrency).await
}

//! URL handling module for Backlink Scout
//!
//! This module provides target URL validation, site root extraction and
//! href resolution for links found inside article content.

mod domain;
mod resolve;

use crate::UrlError;
use url::Url;

// Re-export main functions
pub use domain::site_root;
pub use resolve::{resolve_href, resolve_root_relative};

/// Parses a user-supplied target URL
///
/// Only absolute `http`/`https` URLs with a host are accepted, since the
/// site root (and therefore the sitemap location) is derived from them.
///
/// # Examples
///
/// ```
/// use backlink_scout::url::parse_target_url;
///
/// assert!(parse_target_url("https://example.com/target/").is_ok());
/// assert!(parse_target_url("example.com/target/").is_err());
/// ```
pub fn parse_target_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Collects the distinct site roots of a set of target URLs
///
/// Invalid URLs are logged and skipped. Order follows the first appearance
/// of each root.
pub fn site_roots<S: AsRef<str>>(targets: &[S]) -> Vec<String> {
    let mut roots: Vec<String> = Vec::new();

    for target in targets {
        let target = target.as_ref();
        let root = match parse_target_url(target) {
            Ok(url) => site_root(&url),
            Err(e) => {
                tracing::error!("Invalid URL (missing http/https?): {}: {}", target, e);
                continue;
            }
        };

        match root {
            Some(root) if !roots.contains(&root) => roots.push(root),
            Some(_) => {}
            None => tracing::error!("Cannot derive a site root from {}", target),
        }
    }

    roots
}

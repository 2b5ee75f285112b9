//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the shared, connection-pooling HTTP client
//! - GET requests for sitemaps and pages
//! - Error classification into [`FetchError`]
//!
//! No request is retried; a single failure is final for that URL.

use crate::config::{CrawlOptions, UserAgentConfig};
use crate::FetchError;
use reqwest::Client;
use std::time::Duration;

/// Upper bound on the TCP/TLS connect phase
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds an HTTP client with proper configuration
///
/// The client is built once per run and shared read-only by every worker;
/// cloning it is cheap and reuses the same connection pool.
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `options` - Crawl options carrying the request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use backlink_scout::config::{CrawlOptions, UserAgentConfig};
/// use backlink_scout::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default(), &CrawlOptions::default()).unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    options: &CrawlOptions,
) -> Result<Client, reqwest::Error> {
    let timeout = options.request_timeout();

    Client::builder()
        .user_agent(user_agent.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its body as text
///
/// # Error Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | Timeout (connect or read) | `FetchError::Timeout` |
/// | Connection refused, DNS failure, TLS error | `FetchError::Network` |
/// | Any non-2xx status | `FetchError::HttpStatus` |
/// | Body could not be read or decoded | `FetchError::Body` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch_text(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_error(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    })
}

/// Maps a transport-level reqwest error onto the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

use url::Url;

/// Resolves an `href` against the page it was found on
///
/// Relative and root-relative hrefs are joined onto `base_url`. Absolute
/// hrefs are returned exactly as written (only surrounding whitespace is
/// trimmed), so `https://example.com` stays without a trailing slash and
/// raw non-ASCII paths are not percent-encoded.
///
/// Returns None if a relative href cannot be joined into a valid URL.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use backlink_scout::url::resolve_href;
///
/// let page = Url::parse("https://x.com/bar/").unwrap();
/// assert_eq!(resolve_href("/foo", &page), Some("https://x.com/foo".to_string()));
/// assert_eq!(
///     resolve_href("https://x.com", &page),
///     Some("https://x.com".to_string())
/// );
/// ```
pub fn resolve_href(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    match Url::parse(href) {
        Ok(_) => Some(href.to_string()),
        Err(_) => base_url.join(href).ok().map(|url| url.to_string()),
    }
}

/// Resolves only root-relative hrefs (`/path`, `//host/path`) against the page's site root
///
/// Any other href, absolute or relative, is returned verbatim. This is the
/// looser check used to decide whether a page already links to a target.
pub fn resolve_root_relative(href: &str, page_url: &Url) -> String {
    if href.starts_with('/') {
        if let Ok(resolved) = page_url.join(href) {
            return resolved.to_string();
        }
    }
    href.to_string()
}

use url::Url;

/// Returns the site root (`scheme://host[:port]`) of a URL, without a trailing slash
///
/// Default ports are omitted, explicit non-default ports are kept.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use backlink_scout::url::site_root;
///
/// let url = Url::parse("https://example.com/blog/post/?p=1").unwrap();
/// assert_eq!(site_root(&url), Some("https://example.com".to_string()));
/// ```
pub fn site_root(url: &Url) -> Option<String> {
    let origin = url.origin();
    if origin.is_tuple() {
        Some(origin.ascii_serialization())
    } else {
        None
    }
}

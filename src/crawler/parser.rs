//! HTML parser for article content
//!
//! This module scopes extraction to the page's article container so that
//! navigation, sidebars and footers never produce matches. It extracts:
//! - Every hyperlink inside the article, resolved against the page URL
//! - The hrefs of links inside article paragraphs, as written
//! - The concatenated paragraph text of the article
//!
//! Parsing is permissive: malformed markup never fails, missing elements
//! simply yield empty results.

use crate::url::resolve_href;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// A hyperlink found inside the article container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleLink {
    /// The href resolved to an absolute URL (None if it could not be joined)
    pub url: Option<String>,

    /// Visible text of the anchor, whitespace-trimmed
    pub anchor_text: String,
}

/// Extracted content of a page's first `<article>` element
#[derive(Debug, Clone, Default)]
pub struct ParsedArticle {
    /// All `<a>` elements in the article, in document order
    pub links: Vec<ArticleLink>,

    /// Raw `href` values of `<a>` elements nested in article paragraphs
    pub paragraph_hrefs: Vec<String>,

    /// Text of every `<p>` in the article joined with single spaces
    pub paragraph_text: String,
}

/// Parses HTML content and extracts the first article container
///
/// # Link Extraction Rules
///
/// - Every `<a>` in the article counts, whatever its `rel` or scheme
/// - A missing `href` is treated as empty and resolves to the page itself
/// - Relative and root-relative hrefs are joined onto `base_url`
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The page URL, used for resolving relative links
///
/// # Returns
///
/// * `Some(ParsedArticle)` - The page has an `<article>` element
/// * `None` - No article container was found
///
/// # Example
///
/// ```
/// use backlink_scout::crawler::parse_article;
/// use url::Url;
///
/// let html = r#"<html><body><article><p>See <a href="/foo">this</a>.</p></article></body></html>"#;
/// let base_url = Url::parse("https://x.com/bar/").unwrap();
/// let article = parse_article(html, &base_url).unwrap();
/// assert_eq!(article.links[0].url.as_deref(), Some("https://x.com/foo"));
/// assert_eq!(article.links[0].anchor_text, "this");
/// ```
pub fn parse_article(html: &str, base_url: &Url) -> Option<ParsedArticle> {
    let document = Html::parse_document(html);

    let article_selector = Selector::parse("article").ok()?;
    let article = document.select(&article_selector).next()?;

    Some(ParsedArticle {
        links: extract_links(&article, base_url),
        paragraph_hrefs: extract_paragraph_hrefs(&article),
        paragraph_text: extract_paragraph_text(&article),
    })
}

/// Extracts every anchor in the article with its resolved URL and text
fn extract_links(article: &ElementRef<'_>, base_url: &Url) -> Vec<ArticleLink> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a") {
        for element in article.select(&a_selector) {
            let href = element.value().attr("href").unwrap_or("");
            links.push(ArticleLink {
                url: resolve_href(href, base_url),
                anchor_text: anchor_text(&element),
            });
        }
    }

    links
}

/// Extracts the raw hrefs of anchors nested inside article paragraphs
fn extract_paragraph_hrefs(article: &ElementRef<'_>) -> Vec<String> {
    let mut hrefs = Vec::new();

    if let Ok(selector) = Selector::parse("p a") {
        for element in article.select(&selector) {
            hrefs.push(element.value().attr("href").unwrap_or("").to_string());
        }
    }

    hrefs
}

/// Joins the text content of all article paragraphs with single spaces
fn extract_paragraph_text(article: &ElementRef<'_>) -> String {
    match Selector::parse("p") {
        Ok(p_selector) => article
            .select(&p_selector)
            .map(|p| p.text().collect::<String>())
            .collect::<Vec<_>>()
            .join(" "),
        Err(_) => String::new(),
    }
}

/// Concatenates the anchor's text nodes, each trimmed, skipping blank ones
fn anchor_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<String>()
}

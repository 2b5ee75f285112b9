//! Page matcher
//!
//! Fetches one page and decides how it relates to the search criteria. The
//! network part ([`match_page`]) is separated from the pure part
//! ([`evaluate_page`]) so the matching rules can be tested on static HTML.

use crate::crawler::fetcher::fetch_text;
use crate::crawler::keywords::{find_keyword_sentences, KeywordPattern, KeywordSentences};
use crate::crawler::parser::parse_article;
use crate::url::resolve_root_relative;
use crate::FetchError;
use reqwest::Client;
use url::Url;

/// What a crawl is searching for
///
/// The mode is fixed for a whole crawl.
#[derive(Debug, Clone)]
pub enum MatchCriteria {
    /// Find article links whose resolved href equals one of the targets
    Links { targets: Vec<String> },

    /// Find keyword sentences on pages that do not already link to `target`
    Keywords {
        target: String,
        keywords: Vec<KeywordPattern>,
    },
}

impl MatchCriteria {
    /// Link mode over one or more target URLs
    pub fn links<S: Into<String>>(targets: impl IntoIterator<Item = S>) -> Self {
        Self::Links {
            targets: targets.into_iter().map(Into::into).collect(),
        }
    }

    /// Keyword mode for a single target URL
    ///
    /// Blank keywords are dropped; each remaining keyword is compiled once.
    pub fn keywords<S: AsRef<str>>(target: &str, keywords: &[S]) -> Result<Self, regex::Error> {
        let keywords = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .map(KeywordPattern::new)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::Keywords {
            target: target.to_string(),
            keywords,
        })
    }

    /// The target URLs this crawl reports against
    pub fn targets(&self) -> Vec<&str> {
        match self {
            Self::Links { targets } => targets.iter().map(String::as_str).collect(),
            Self::Keywords { target, .. } => vec![target.as_str()],
        }
    }

    /// Short human-readable name of the mode
    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Links { .. } => "link",
            Self::Keywords { .. } => "keyword",
        }
    }
}

/// A link to a target found on a source page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch {
    pub source: String,
    pub anchor_text: String,
}

/// Keyword sentences found on a source page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatch {
    pub source: String,
    pub keywords: Vec<KeywordSentences>,
}

/// One match, in the shape of the crawl's mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRecord {
    Link(LinkMatch),
    Keyword(KeywordMatch),
}

impl MatchRecord {
    /// The page the match was found on
    pub fn source(&self) -> &str {
        match self {
            Self::Link(m) => &m.source,
            Self::Keyword(m) => &m.source,
        }
    }
}

/// A match attributed to the target it was found for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetMatch {
    pub target: String,
    pub record: MatchRecord,
}

/// Classification of one page in one crawl pass
#[derive(Debug)]
pub enum PageOutcome {
    /// At least one match; link mode may report several targets per page
    Matched(Vec<TargetMatch>),

    /// Keyword mode only: the article already links to the target
    SkippedContainsTarget,

    /// Nothing matched (also "no keywords found")
    NoMatch { article_found: bool },

    /// The page could not be fetched
    FetchError(FetchError),
}

impl PageOutcome {
    /// True when the page had an `<article>` container
    pub fn article_found(&self) -> bool {
        match self {
            Self::Matched(_) | Self::SkippedContainsTarget => true,
            Self::NoMatch { article_found } => *article_found,
            Self::FetchError(_) => false,
        }
    }
}

/// Fetches a page and classifies it against `criteria`
///
/// Never fails: every fetch problem becomes [`PageOutcome::FetchError`].
pub async fn match_page(client: &Client, page_url: &str, criteria: &MatchCriteria) -> PageOutcome {
    if let Err(e) = Url::parse(page_url) {
        return invalid_page_url(page_url, e);
    }

    match fetch_text(client, page_url).await {
        Ok(body) => evaluate_page(&body, page_url, criteria),
        Err(e) => {
            tracing::debug!("Failed to fetch page {}: {}", page_url, e);
            PageOutcome::FetchError(e)
        }
    }
}

/// Classifies already-fetched HTML against `criteria`
///
/// `page_url` is reported as the match source exactly as given; its parsed
/// form is only the base for resolving relative hrefs.
pub fn evaluate_page(html: &str, page_url: &str, criteria: &MatchCriteria) -> PageOutcome {
    let base_url = match Url::parse(page_url) {
        Ok(url) => url,
        Err(e) => return invalid_page_url(page_url, e),
    };

    let article = match parse_article(html, &base_url) {
        Some(article) => article,
        None => {
            tracing::debug!("No <article> found on {}", page_url);
            return PageOutcome::NoMatch {
                article_found: false,
            };
        }
    };

    let source = page_url;

    match criteria {
        MatchCriteria::Links { targets } => {
            let mut matches = Vec::new();

            for target in targets {
                for link in &article.links {
                    if link.url.as_deref() == Some(target.as_str()) {
                        matches.push(TargetMatch {
                            target: target.clone(),
                            record: MatchRecord::Link(LinkMatch {
                                source: source.to_string(),
                                anchor_text: link.anchor_text.clone(),
                            }),
                        });
                    }
                }
            }

            if matches.is_empty() {
                PageOutcome::NoMatch {
                    article_found: true,
                }
            } else {
                PageOutcome::Matched(matches)
            }
        }

        MatchCriteria::Keywords { target, keywords } => {
            let links_to_target = article
                .paragraph_hrefs
                .iter()
                .any(|href| resolve_root_relative(href, &base_url) == *target);

            if links_to_target {
                tracing::debug!("URL skipped (contains target link): {}", source);
                return PageOutcome::SkippedContainsTarget;
            }

            let found = find_keyword_sentences(&article.paragraph_text, keywords);
            if found.is_empty() {
                tracing::debug!("No matching keywords found in URL: {}", source);
                PageOutcome::NoMatch {
                    article_found: true,
                }
            } else {
                tracing::debug!("Keywords found in URL: {}", source);
                PageOutcome::Matched(vec![TargetMatch {
                    target: target.clone(),
                    record: MatchRecord::Keyword(KeywordMatch {
                        source: source.to_string(),
                        keywords: found,
                    }),
                }])
            }
        }
    }
}

fn invalid_page_url(page_url: &str, error: url::ParseError) -> PageOutcome {
    PageOutcome::FetchError(FetchError::Network {
        url: page_url.to_string(),
        message: format!("Invalid URL: {}", error),
    })
}

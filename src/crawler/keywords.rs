//! Keyword sentence extraction
//!
//! A "sentence" here is a heuristic: the run of characters between two of the
//! terminators `.`, `!` and `?`, ending with the terminator. A keyword matches
//! as a whole word, case-insensitively. Abbreviations such as "e.g." split
//! sentences early; that behavior is part of the contract.

use regex::{Regex, RegexBuilder};

/// A compiled keyword pattern
#[derive(Debug, Clone)]
pub struct KeywordPattern {
    keyword: String,
    sentence: Regex,
}

impl KeywordPattern {
    /// Compiles the sentence pattern for one keyword
    ///
    /// The keyword is matched literally (regex metacharacters are escaped).
    pub fn new(keyword: &str) -> Result<Self, regex::Error> {
        let pattern = format!(r"[^.!?]*\b{}\b[^.!?]*[.!?]", regex::escape(keyword));
        let sentence = RegexBuilder::new(&pattern).case_insensitive(true).build()?;

        Ok(Self {
            keyword: keyword.to_string(),
            sentence,
        })
    }

    /// The keyword as supplied by the user
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Returns every sentence of `text` containing the keyword, trimmed, in
    /// document order
    ///
    /// Matches never overlap, so one sentence holding the keyword twice is
    /// returned once, while repeated identical sentences are all returned.
    pub fn find_sentences(&self, text: &str) -> Vec<String> {
        self.sentence
            .find_iter(text)
            .map(|m| m.as_str().trim().to_string())
            .collect()
    }
}

/// The sentences matched for one keyword on one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSentences {
    pub keyword: String,
    pub sentences: Vec<String>,
}

/// Parses a comma-separated keyword list, trimming entries and dropping blanks
///
/// # Examples
///
/// ```
/// use backlink_scout::crawler::parse_keyword_list;
///
/// assert_eq!(parse_keyword_list(" casino, bonus ,,"), vec!["casino", "bonus"]);
/// ```
pub fn parse_keyword_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Scans `text` for each keyword in turn
///
/// Keywords with no sentence are left out; the rest keep the order of
/// `patterns`.
pub fn find_keyword_sentences(text: &str, patterns: &[KeywordPattern]) -> Vec<KeywordSentences> {
    patterns
        .iter()
        .filter_map(|pattern| {
            let sentences = pattern.find_sentences(text);
            if sentences.is_empty() {
                None
            } else {
                Some(KeywordSentences {
                    keyword: pattern.keyword().to_string(),
                    sentences,
                })
            }
        })
        .collect()
}

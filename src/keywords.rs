//! Keyword extraction from natural-language questions.
//!
//! Tokenization is purely lexical: split on non-word boundaries, lower-case,
//! drop stop words. No stemming beyond the singularization rule used by the
//! matcher.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"\w+").unwrap();
}

/// The fixed closed set of function words removed during extraction.
///
/// Owned by the catalog configuration; not tunable per call.
pub fn default_stopwords() -> HashSet<String> {
    [
        "the", "a", "an", "of", "to", "and", "show", "me", "list", "all", "get", "give",
        "display", "find", "with", "for", "on", "in", "at", "their",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Extract normalized keyword tokens from a question.
///
/// An empty or all-stopword question yields an empty sequence; that is a
/// valid outcome, not an error.
pub fn extract(question: &str, stopwords: &HashSet<String>) -> Vec<String> {
    let lowered = question.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .filter(|w| !stopwords.contains(w))
        .collect()
}

/// Naive English singularization: "ies" -> "y", trailing "s" dropped unless
/// the word ends in "ss".
pub fn singular(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{}y", stem);
    }
    if word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

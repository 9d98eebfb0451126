//! Lexical helpers shared by the scoring functions.
//!
//! Everything here is deterministic string analysis: word extraction,
//! sentence splitting, and term-set construction. Scores built on these
//! helpers stay pure functions of their inputs.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());
static SENTENCE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

/// Lowercased word tokens in document order.
pub fn words(text: &str) -> Vec<String> {
    WORD_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// The distinct lowercased word tokens of a text.
pub fn word_set(text: &str) -> BTreeSet<String> {
    words(text).into_iter().collect()
}

/// Distinct lowercased words with the given stopwords removed.
///
/// This is the "significant term" set used for query coverage and reuse
/// checks; stopwords would otherwise let filler words inflate overlap.
pub fn significant_terms(text: &str, stopwords: &[String]) -> BTreeSet<String> {
    let mut terms = word_set(text);
    for stopword in stopwords {
        terms.remove(stopword.as_str());
    }
    terms
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Sentences of a text: terminator-delimited fragments with content.
pub fn sentences(text: &str) -> Vec<&str> {
    SENTENCE_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Mean words per sentence, or `None` when the text has no sentences.
pub fn mean_sentence_length(text: &str) -> Option<f64> {
    let sentences = sentences(text);
    if sentences.is_empty() {
        return None;
    }
    let total_words: usize = sentences.iter().map(|s| word_count(s)).sum();
    Some(total_words as f64 / sentences.len() as f64)
}

/// Clamp a score into [0, 1], mapping NaN to 0.
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Weighted mean over `(score, weight)` pairs.
///
/// The divisor is always the full weight total: a zero score pulls the
/// aggregate down instead of being silently renormalized away.
pub fn weighted_mean(pairs: &[(f64, f64)]) -> f64 {
    let total_weight: f64 = pairs.iter().map(|(_, w)| w).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    let weighted_sum: f64 = pairs.iter().map(|(s, w)| s * w).sum();
    weighted_sum / total_weight
}

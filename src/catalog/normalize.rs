//! Title normalization: lowercasing, punctuation stripping, stopword removal.
//!
//! Produces the `std_title` column consumed by the retrieval corpus. Queries
//! are assumed to be normalized with the same function, so the retriever
//! itself only splits on whitespace.

use std::collections::HashSet;
use std::sync::OnceLock;

/// Common English stop words. They add noise and don't help with retrieval.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with",
    "by", "from", "as", "is", "are", "was", "were", "be", "been", "being", "have",
    "has", "had", "do", "does", "did", "will", "would", "should", "could", "what",
    "which", "who", "where", "when", "why", "how", "this", "that", "these", "those",
];

fn stop_words() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

/// Normalize a raw item title into its `std_title` form.
///
/// Lowercases, strips ASCII punctuation, splits on whitespace, and drops
/// stop words. Returns the surviving tokens joined by single spaces.
pub fn normalize_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();

    stripped
        .split_whitespace()
        .filter(|token| !stop_words().contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whitespace tokenization of already-normalized text.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

//! Text normalization and sentence boundary utilities.

use regex::Regex;
use std::sync::LazyLock;

/// Sentence boundary: terminal punctuation followed by whitespace.
static SENTENCE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[.!?]+\s+").expect("sentence boundary pattern is valid")
});

/// Normalize text for coverage comparison.
///
/// Lower-cases, strips punctuation and collapses whitespace.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Character length of the normalized text.
pub fn normalized_len(text: &str) -> usize {
    normalize(text).chars().count()
}

/// Fraction of `full` reconstructed by `parts` joined with spaces, clipped to 1.
///
/// An empty `full` is trivially covered.
pub fn coverage_ratio<S: AsRef<str>>(parts: &[S], full: &str) -> f64 {
    let full_len = normalized_len(full);
    if full_len == 0 {
        return 1.0;
    }

    let joined = parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");

    (normalized_len(&joined) as f64 / full_len as f64).min(1.0)
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Split text into trimmed sentences.
///
/// Falls back to the whole input as one sentence when no boundary is found,
/// and to its whitespace-joined tokens when it cannot be split at all.
/// Blank input yields no sentences.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut last = 0;

    for m in SENTENCE_BOUNDARY.find_iter(text) {
        let end = m.start() + m.as_str().trim_end().len();
        push_trimmed(&mut sentences, &text[last..end]);
        last = m.end();
    }
    push_trimmed(&mut sentences, &text[last..]);

    if sentences.is_empty() {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if !tokens.is_empty() {
            sentences.push(tokens.join(" "));
        }
    }

    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        sentences.push(text.to_string());
    }
}

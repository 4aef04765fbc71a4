//! Splits continuous narration into one text segment per clip.

use crate::config::SegmenterConfig;
use crate::text::{split_sentences, word_count};

/// Narration splitter for clip-driven mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextSegmenter {
    pub config: SegmenterConfig,
}

impl TextSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Split `narration` into exactly `n` ordered segments.
    ///
    /// Prefers sentence boundaries when there are more sentences than
    /// segments, otherwise splits evenly by word count. Blank narration yields
    /// `n` empty segments, which the alignment checks reject downstream.
    pub fn split(&self, narration: &str, n: usize) -> Vec<String> {
        if n == 0 {
            return Vec::new();
        }

        let sentences = split_sentences(narration);
        if sentences.is_empty() {
            return vec![String::new(); n];
        }

        if sentences.len() <= n {
            tracing::debug!(
                sentences = sentences.len(),
                segments = n,
                "too few sentences, splitting by word count"
            );
            return split_by_words(&sentences.join(" "), n);
        }

        let groups = self.group_sentences(&sentences, n);

        if groups.len() < n {
            tracing::debug!(
                groups = groups.len(),
                segments = n,
                "sentence grouping underfilled, splitting by word count"
            );
            return split_by_words(&sentences.join(" "), n);
        }

        groups
    }

    /// Greedily group sentences toward an even per-segment word weight.
    ///
    /// Returns at most `n` groups: the final group absorbs every remaining
    /// sentence. A heavy tail can leave fewer than `n`.
    fn group_sentences(&self, sentences: &[String], n: usize) -> Vec<String> {
        let weights: Vec<usize> = sentences.iter().map(|s| word_count(s).max(1)).collect();
        let total: usize = weights.iter().sum();
        let target = total as f64 / n as f64;
        let close_at = target * self.config.accumulate_fraction;

        let mut groups: Vec<String> = Vec::with_capacity(n);
        let mut current: Vec<&str> = Vec::new();
        let mut current_weight = 0usize;

        for (i, (sentence, &weight)) in sentences.iter().zip(&weights).enumerate() {
            let is_final_group = groups.len() + 1 == n;

            if !current.is_empty() && !is_final_group {
                let sentences_left = sentences.len() - i;
                let groups_left = n - groups.len() - 1;

                let can_close = sentences_left >= groups_left;
                let overshoots = (current_weight + weight) as f64 > target;
                let near_target = current_weight as f64 >= close_at;

                if can_close && (overshoots || near_target) {
                    groups.push(current.join(" "));
                    current.clear();
                    current_weight = 0;
                }
            }

            current.push(sentence);
            current_weight += weight;
        }

        if !current.is_empty() {
            groups.push(current.join(" "));
        }

        groups
    }
}

/// Distribute words across `n` buckets, `ceil(remaining / slots)` at a time.
///
/// Every bucket gets at least one word while words remain; the last bucket
/// absorbs the remainder.
pub fn split_by_words(text: &str, n: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut buckets = Vec::with_capacity(n);
    let mut rest = &words[..];

    for slot in 0..n {
        let slots_left = n - slot;
        let take = if slots_left == 1 {
            rest.len()
        } else {
            rest.len().div_ceil(slots_left)
        };

        let (bucket, tail) = rest.split_at(take);
        buckets.push(bucket.join(" "));
        rest = tail;
    }

    buckets
}

//! Subdivides narration segments into short caption cues.
//!
//! Cue time is split by character length rather than word count, since
//! longer words take longer to say. Each cue gets at least a minimum
//! on-screen time, and the last cue of a segment ends exactly on the
//! segment's end.

use crate::config::CaptionConfig;
use crate::timeline::round_ms;
use crate::types::{CaptionCue, NarrationSegment};
use regex::Regex;
use std::sync::LazyLock;

/// Phrase separator: sentence-ending punctuation before whitespace or end, or newlines.
static PHRASE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[.!?]+(?:\s+|$)|\n+").expect("phrase break pattern is valid")
});

/// Caption cue generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct CaptionChunker {
    pub config: CaptionConfig,
}

impl CaptionChunker {
    pub fn new(config: CaptionConfig) -> Self {
        Self { config }
    }

    /// Build cues for every segment with text, in timeline order.
    ///
    /// Stops captioning at the first segment that would exceed the cue cap;
    /// that segment and the rest stay uncaptioned.
    pub fn chunk(&self, segments: &[NarrationSegment]) -> Vec<CaptionCue> {
        let mut cues = Vec::new();

        for segment in segments {
            let chunks = self.chunk_words(&segment.text);
            if chunks.is_empty() || segment.end_sec <= segment.start_sec {
                continue;
            }

            if cues.len() + chunks.len() > self.config.max_cues {
                tracing::warn!(
                    max_cues = self.config.max_cues,
                    clip_index = segment.clip_index,
                    "caption cue cap reached, remaining segments left uncaptioned"
                );
                break;
            }

            cues.extend(merge_empty_cues(self.time_chunks(segment, chunks)));
        }

        cues
    }

    /// Group display words into cue texts.
    fn chunk_words(&self, text: &str) -> Vec<String> {
        let words: Vec<String> = PHRASE_BREAK
            .split(text)
            .map(normalize_dashes)
            .flat_map(|phrase| {
                phrase
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect();

        words
            .chunks(self.config.words_per_cue.max(1))
            .map(|chunk| {
                let text = chunk.join(" ");
                if self.config.uppercase {
                    text.to_uppercase()
                } else {
                    text
                }
            })
            .collect()
    }

    /// Spread the segment's span over its chunks.
    fn time_chunks(&self, segment: &NarrationSegment, chunks: Vec<String>) -> Vec<CaptionCue> {
        let n = chunks.len();
        let span = segment.end_sec - segment.start_sec;
        let floor = self.config.min_cue_secs.min(span / n as f64);
        let spare = span - floor * n as f64;

        let weights: Vec<usize> = chunks.iter().map(|c| c.chars().count().max(1)).collect();
        let total_weight: usize = weights.iter().sum();

        let mut cursor = segment.start_sec;

        chunks
            .into_iter()
            .zip(weights)
            .enumerate()
            .map(|(i, (text, weight))| {
                let end_sec = if i + 1 == n {
                    segment.end_sec
                } else {
                    let share = spare * weight as f64 / total_weight as f64;
                    round_ms(cursor + floor + share).min(segment.end_sec)
                };

                let cue = CaptionCue {
                    start_sec: cursor,
                    end_sec,
                    text,
                };
                cursor = end_sec;
                cue
            })
            .collect()
    }
}

/// Fold cues that rounded to zero length into the following cue, or into
/// the previous one at the end of a segment.
fn merge_empty_cues(cues: Vec<CaptionCue>) -> Vec<CaptionCue> {
    let mut merged: Vec<CaptionCue> = Vec::with_capacity(cues.len());
    let mut carry: Option<String> = None;

    for mut cue in cues {
        if let Some(text) = carry.take() {
            cue.text = format!("{text} {}", cue.text);
        }

        if cue.end_sec > cue.start_sec {
            merged.push(cue);
        } else {
            carry = Some(cue.text);
        }
    }

    if let (Some(text), Some(last)) = (carry, merged.last_mut()) {
        last.text.push(' ');
        last.text.push_str(&text);
    }

    merged
}

/// Hyphens and dashes read as word breaks on screen.
fn normalize_dashes(phrase: &str) -> String {
    phrase.replace(['-', '\u{2010}', '\u{2013}', '\u{2014}'], " ")
}

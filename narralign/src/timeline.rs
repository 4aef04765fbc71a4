//! Builds contiguous timelines from ordered segment durations.

use crate::types::{NarrationSegment, SegmentationMode};

/// Round seconds to millisecond precision.
pub fn round_ms(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

/// One timeline input: a clip, its narration and its duration.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineEntry {
    pub clip_index: usize,
    pub text: String,
    pub duration_sec: f64,
    pub source: SegmentationMode,
    pub source_clip_duration_sec: Option<f64>,
}

/// Place entries back to back starting at zero.
///
/// Each end is the millisecond-rounded running sum of durations, so rounding
/// never accumulates, and each start is the previous end. The stored
/// duration is `end - start`. Rebuild from fresh durations instead of
/// patching an existing timeline.
pub fn build_timeline(entries: Vec<TimelineEntry>) -> Vec<NarrationSegment> {
    let mut elapsed = 0.0;
    let mut start_sec = 0.0;

    entries
        .into_iter()
        .map(|entry| {
            elapsed += entry.duration_sec;
            let end_sec = round_ms(elapsed);

            let segment = NarrationSegment {
                clip_index: entry.clip_index,
                text: entry.text,
                duration_sec: round_ms(end_sec - start_sec),
                start_sec,
                end_sec,
                source: entry.source,
                source_clip_duration_sec: entry.source_clip_duration_sec,
            };
            start_sec = end_sec;
            segment
        })
        .collect()
}

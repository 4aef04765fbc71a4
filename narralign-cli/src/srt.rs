//! SRT subtitle conversion utilities.
//!
//! Converts caption cues into SRT subtitle format.

use narralign::types::CaptionCue;
use srtlib::{Subtitle, Timestamp};

/// Convert caption cues to SRT Subtitles.
pub fn to_subtitles(cues: &[CaptionCue]) -> Vec<Subtitle> {
    cues.iter()
        .zip(1..)
        .map(|(cue, i)| create_subtitle(cue, i))
        .collect()
}

/// Create a subtitle from a cue.
fn create_subtitle(cue: &CaptionCue, index: usize) -> Subtitle {
    Subtitle::new(
        index,
        secs_to_timestamp(cue.start_sec),
        secs_to_timestamp(cue.end_sec),
        cue.text.clone(),
    )
}

/// Convert seconds to SRT Timestamp
fn secs_to_timestamp(secs: f64) -> Timestamp {
    Timestamp::from_milliseconds((secs.max(0.0) * 1000.0).round() as u32)
}

/// Format subtitles as SRT file content.
pub fn display_subtitles(subtitles: &[Subtitle]) -> String {
    let mut out = subtitles
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Display preview of subtitles (first and last entries).
pub fn preview_subtitles(subtitles: &[Subtitle], head_count: usize, tail_count: usize) -> String {
    let total = subtitles.len();

    if total <= head_count + tail_count {
        return display_subtitles(subtitles);
    }

    let mut out: Vec<String> = subtitles[..head_count].iter().map(|s| s.to_string()).collect();
    out.push("...".to_string());
    out.extend(subtitles[total - tail_count..].iter().map(|s| s.to_string()));
    out.join("\n\n") + "\n"
}

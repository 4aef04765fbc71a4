//! Core types for narralign.
//!
//! Persisted types serialize with camelCase keys in declaration order, so the
//! JSON artifacts diff cleanly between attempts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Strategy that produced the narration segments of one timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentationMode {
    /// Each scene carries its own authored narration
    SceneDriven,
    /// Only a clip count is known; narration is split to match
    ClipDriven,
}

impl fmt::Display for SegmentationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentationMode::SceneDriven => f.write_str("scene-driven"),
            SegmentationMode::ClipDriven => f.write_str("clip-driven"),
        }
    }
}

/// Narration bound to exactly one clip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrationSegment {
    /// Index of the clip this segment plays over
    pub clip_index: usize,
    /// Narration spoken during this segment
    pub text: String,
    /// Seconds this segment occupies in the final timeline
    pub duration_sec: f64,
    /// Start time in seconds
    pub start_sec: f64,
    /// End time in seconds
    pub end_sec: f64,
    /// Strategy that produced this segment
    pub source: SegmentationMode,
    /// Natural duration of the underlying clip, used for stretch checks only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_clip_duration_sec: Option<f64>,
}

/// Full timeline for one video.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentMap {
    pub mode: SegmentationMode,
    pub clip_count: usize,
    /// Measured duration of the concatenated narration track
    pub audio_duration_sec: f64,
    pub segments: Vec<NarrationSegment>,
}

impl SegmentMap {
    pub fn new(
        mode: SegmentationMode,
        audio_duration_sec: f64,
        segments: Vec<NarrationSegment>,
    ) -> Self {
        Self {
            mode,
            clip_count: segments.len(),
            audio_duration_sec,
            segments,
        }
    }

    /// Sum of all segment durations.
    pub fn total_duration_sec(&self) -> f64 {
        self.segments.iter().map(|s| s.duration_sec).sum()
    }
}

/// One on-screen subtitle unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionCue {
    pub start_sec: f64,
    pub end_sec: f64,
    pub text: String,
}

/// Target video length class; selects the alignment policy preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentFormat {
    #[default]
    Short,
    Long,
}

/// One visual scene of the script.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Narration authored for this scene, if any
    #[serde(default)]
    pub narration: Option<String>,
}

impl Scene {
    pub fn new(narration: impl Into<String>) -> Self {
        Self {
            narration: Some(narration.into()),
        }
    }

    /// Narration text, trimmed; `None` when missing or blank.
    pub fn narration_text(&self) -> Option<&str> {
        self.narration
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }
}

/// Script for one video: the full narration plus its scene list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Complete top-level narration
    #[serde(default)]
    pub narration: String,
    #[serde(default)]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub format: ContentFormat,
}

impl Script {
    /// Top-level narration, or the scene narrations joined when it is blank.
    pub fn full_narration(&self) -> String {
        if !self.narration.trim().is_empty() {
            return self.narration.clone();
        }

        self.scenes
            .iter()
            .filter_map(Scene::narration_text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Kind of media standing at one clip index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClipKind {
    Video,
    /// Still image rendered with a zoom effect to the segment's duration
    Image,
}

/// A clip discovered on disk.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipSource {
    pub index: usize,
    pub path: PathBuf,
    pub kind: ClipKind,
}

impl ClipSource {
    pub fn new(index: usize, path: impl Into<PathBuf>, kind: ClipKind) -> Self {
        Self {
            index,
            path: path.into(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_serializes_with_camel_case_fields() {
        let segment = NarrationSegment {
            clip_index: 0,
            text: "Hello.".to_string(),
            duration_sec: 1.5,
            start_sec: 0.0,
            end_sec: 1.5,
            source: SegmentationMode::ClipDriven,
            source_clip_duration_sec: Some(3.0),
        };

        let json = serde_json::to_string(&segment).unwrap();

        assert_eq!(
            json,
            r#"{"clipIndex":0,"text":"Hello.","durationSec":1.5,"startSec":0.0,"endSec":1.5,"source":"clip-driven","sourceClipDurationSec":3.0}"#
        );
    }

    #[test]
    fn segment_map_counts_clips() {
        let map = SegmentMap::new(SegmentationMode::SceneDriven, 0.0, Vec::new());

        assert_eq!(map.clip_count, 0);
        assert_eq!(map.total_duration_sec(), 0.0);
    }

    #[test]
    fn script_parses_with_missing_fields() {
        let script: Script =
            serde_json::from_str(r#"{"scenes": [{"narration": " "}, {}], "format": "long"}"#)
                .unwrap();

        assert_eq!(script.narration, "");
        assert_eq!(script.format, ContentFormat::Long);
        assert_eq!(script.scenes.len(), 2);
        assert!(script.scenes.iter().all(|s| s.narration_text().is_none()));
    }

    #[test]
    fn full_narration_falls_back_to_scenes() {
        let script = Script {
            narration: "  ".to_string(),
            scenes: vec![Scene::new("First."), Scene::default(), Scene::new(" Second. ")],
            ..Script::default()
        };

        assert_eq!(script.full_narration(), "First. Second.");
    }
}

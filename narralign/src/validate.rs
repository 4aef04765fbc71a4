//! Alignment checks over a candidate segment map.
//!
//! Every check is evaluated so one report can carry several reasons. A failed
//! report converts into [`AlignmentBlocked`], a recoverable signal carrying a
//! remediation hint and the clip files the caller still has to supply.

use crate::config::AlignmentPolicy;
use crate::text::coverage_ratio;
use crate::types::{NarrationSegment, SegmentMap, SegmentationMode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Why a segmentation failed, in check order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reason {
    CoverageTooLow,
    DurationDeltaTooHigh,
    EmptySegmentText,
    StretchRatioTooHigh { segment_index: usize },
    InsufficientClips,
}

impl Reason {
    /// Stable reason code without parameters.
    pub fn code(&self) -> &'static str {
        match self {
            Reason::CoverageTooLow => "coverage_too_low",
            Reason::DurationDeltaTooHigh => "duration_delta_too_high",
            Reason::EmptySegmentText => "empty_segment_text",
            Reason::StretchRatioTooHigh { .. } => "stretch_ratio_too_high",
            Reason::InsufficientClips => "insufficient_clips",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::StretchRatioTooHigh { segment_index } => {
                write!(f, "{}:segment_{segment_index}", self.code())
            }
            _ => f.write_str(self.code()),
        }
    }
}

/// Unknown reason code.
#[derive(Debug, thiserror::Error)]
#[error("unknown alignment reason: {0}")]
pub struct ParseReasonError(String);

impl FromStr for Reason {
    type Err = ParseReasonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reason = match s {
            "coverage_too_low" => Reason::CoverageTooLow,
            "duration_delta_too_high" => Reason::DurationDeltaTooHigh,
            "empty_segment_text" => Reason::EmptySegmentText,
            "insufficient_clips" => Reason::InsufficientClips,
            _ => {
                let segment_index = s
                    .strip_prefix("stretch_ratio_too_high:segment_")
                    .and_then(|i| i.parse().ok())
                    .ok_or_else(|| ParseReasonError(s.to_string()))?;
                Reason::StretchRatioTooHigh { segment_index }
            }
        };
        Ok(reason)
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Reason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Measured values behind the verdict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentChecks {
    pub coverage_ratio: f64,
    pub duration_delta_sec: f64,
    pub empty_segment_count: usize,
    pub available_clip_count: usize,
    pub required_clip_count: usize,
    pub max_stretch_ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stretch_segment_index: Option<usize>,
}

/// Pass/fail verdict over a segment map, self-contained for diagnosis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentReport {
    pub mode: SegmentationMode,
    pub passed: bool,
    pub reasons: Vec<Reason>,
    pub checks: AlignmentChecks,
    pub segments: Vec<NarrationSegment>,
}

impl AlignmentReport {
    /// First failing reason, if any.
    pub fn primary_reason(&self) -> Option<Reason> {
        self.reasons.first().copied()
    }
}

/// What the segment map is checked against.
#[derive(Clone, Copy, Debug)]
pub struct AlignmentTargets<'a> {
    /// Full top-level narration, for coverage
    pub full_narration: &'a str,
    /// Measured duration of the concatenated narration audio
    pub measured_audio_sec: f64,
    /// Clips actually available on disk
    pub available_clips: usize,
    /// Clips the script requires
    pub required_clips: usize,
}

/// Structured, recoverable alignment failure.
///
/// Serializes to `{ reason, reasons, hint?, requiredFiles }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("alignment blocked: {reason}")]
pub struct AlignmentBlocked {
    /// Primary reason code
    pub reason: String,
    /// All reason codes in check order
    pub reasons: Vec<String>,
    /// Human-actionable remediation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Expected clip file names
    pub required_files: Vec<String>,
}

/// Expected clip file name for an index.
pub fn clip_file_name(index: usize) -> String {
    format!("clip_{index}.mp4")
}

/// Expected clip file names for indices `0..count`.
pub fn required_files(count: usize) -> Vec<String> {
    (0..count).map(clip_file_name).collect()
}

/// Runs the alignment checks with a fixed policy.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlignmentValidator {
    pub policy: AlignmentPolicy,
}

impl AlignmentValidator {
    pub fn new(policy: AlignmentPolicy) -> Self {
        Self { policy }
    }

    /// Evaluate every check against `map` and produce a report.
    pub fn build_alignment_checks(
        &self,
        map: &SegmentMap,
        targets: &AlignmentTargets<'_>,
    ) -> AlignmentReport {
        let clip_driven = map.mode == SegmentationMode::ClipDriven;
        let mut reasons = Vec::new();

        let texts: Vec<&str> = map.segments.iter().map(|s| s.text.as_str()).collect();
        let coverage = coverage_ratio(&texts, targets.full_narration);
        if clip_driven && coverage < self.policy.min_coverage_ratio {
            reasons.push(Reason::CoverageTooLow);
        }

        let delta = (map.total_duration_sec() - targets.measured_audio_sec).abs();
        let max_delta = match map.mode {
            SegmentationMode::ClipDriven => self.policy.max_duration_delta_secs,
            SegmentationMode::SceneDriven => self.policy.max_scene_duration_delta_secs,
        };
        if delta > max_delta {
            reasons.push(Reason::DurationDeltaTooHigh);
        }

        let empty_count = map
            .segments
            .iter()
            .filter(|s| s.text.trim().is_empty())
            .count();
        if empty_count > 0 {
            reasons.push(Reason::EmptySegmentText);
        }

        let (max_stretch, stretch_index) = max_stretch_ratio(&map.segments);
        if clip_driven && max_stretch > self.policy.max_stretch_ratio {
            if let Some(segment_index) = stretch_index {
                reasons.push(Reason::StretchRatioTooHigh { segment_index });
            }
        }

        if clip_driven && targets.available_clips < targets.required_clips {
            reasons.push(Reason::InsufficientClips);
        }

        let passed = reasons.is_empty();

        tracing::debug!(
            mode = %map.mode,
            passed,
            coverage,
            delta,
            empty_count,
            max_stretch,
            "alignment checks"
        );

        AlignmentReport {
            mode: map.mode,
            passed,
            reasons,
            checks: AlignmentChecks {
                coverage_ratio: coverage,
                duration_delta_sec: delta,
                empty_segment_count: empty_count,
                available_clip_count: targets.available_clips,
                required_clip_count: targets.required_clips,
                max_stretch_ratio: max_stretch,
                stretch_segment_index: stretch_index,
            },
            segments: map.segments.clone(),
        }
    }
}

/// Largest segment-over-source duration ratio, floored at 1.
///
/// Segments without a known source duration count as unstretched. The index
/// is the clip index of the worst segment, reported only when it stretches.
fn max_stretch_ratio(segments: &[NarrationSegment]) -> (f64, Option<usize>) {
    let mut max = 1.0;
    let mut index = None;

    for segment in segments {
        let source = segment
            .source_clip_duration_sec
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(segment.duration_sec);

        if source <= 0.0 {
            continue;
        }

        let ratio = segment.duration_sec / source;
        if ratio > max {
            max = ratio;
            index = Some(segment.clip_index);
        }
    }

    (max, index)
}

/// Pass an approved report through, or convert a failed one into a blocked
/// signal listing clip files up to `max(scene_count, required clips)`.
pub fn ensure_alignment_or_block(
    report: &AlignmentReport,
    scene_count: usize,
) -> Result<(), AlignmentBlocked> {
    let Some(primary) = report.primary_reason() else {
        return Ok(());
    };

    let file_count = scene_count.max(report.checks.required_clip_count);

    Err(AlignmentBlocked {
        reason: primary.to_string(),
        reasons: report.reasons.iter().map(ToString::to_string).collect(),
        hint: Some(remediation_hint(primary, report)),
        required_files: required_files(file_count),
    })
}

fn remediation_hint(reason: Reason, report: &AlignmentReport) -> String {
    let checks = &report.checks;

    match reason {
        Reason::CoverageTooLow => format!(
            "only {:.0}% of the narration fits the clips; upload more clips or shorten the narration",
            checks.coverage_ratio * 100.0
        ),
        Reason::DurationDeltaTooHigh => format!(
            "timeline is {:.2}s off the narration audio; regenerate the voiceover",
            checks.duration_delta_sec
        ),
        Reason::EmptySegmentText => match report.mode {
            SegmentationMode::SceneDriven => "ensure every scene has voiceover text".to_string(),
            SegmentationMode::ClipDriven => format!(
                "narration is too short for {} clips; lengthen the narration or remove clips",
                report.segments.len()
            ),
        },
        Reason::StretchRatioTooHigh { segment_index } => format!(
            "{} would play at {:.1}x slow motion; shorten its narration or upload a longer clip",
            clip_file_name(segment_index),
            checks.max_stretch_ratio
        ),
        Reason::InsufficientClips => {
            let missing = checks
                .required_clip_count
                .saturating_sub(checks.available_clip_count);
            let plural = if missing == 1 { "" } else { "s" };
            format!(
                "upload {missing} more clip{plural} starting at {}",
                clip_file_name(checks.available_clip_count)
            )
        }
    }
}

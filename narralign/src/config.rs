//! Policy configuration passed into the engine at construction time.

use crate::types::ContentFormat;

/// Default minimum coverage of the full narration by joined segment text.
const DEFAULT_MIN_COVERAGE_RATIO: f64 = 0.98;

/// Default minimum narration coverage for choosing scene-driven mode.
const DEFAULT_SCENE_COVERAGE_MIN: f64 = 0.90;

/// Default fraction of the target weight at which a segment is closed.
const DEFAULT_ACCUMULATE_FRACTION: f64 = 0.85;

/// Default number of words per caption cue.
pub const DEFAULT_WORDS_PER_CUE: usize = 4;

/// Default minimum on-screen time of a caption cue in seconds.
pub const DEFAULT_MIN_CUE_SECS: f64 = 0.2;

/// Default cap on caption cues across the whole video.
pub const DEFAULT_MAX_CUES: usize = 600;

/// Thresholds for the alignment checks.
///
/// The numbers are empirical; presets reproduce the established behavior.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignmentPolicy {
    /// Minimum coverage ratio in clip-driven mode
    pub min_coverage_ratio: f64,

    /// Maximum |timeline - audio| in clip-driven mode
    pub max_duration_delta_secs: f64,

    /// Maximum |timeline - audio| in scene-driven mode
    pub max_scene_duration_delta_secs: f64,

    /// Maximum segment duration over source clip duration in clip-driven mode
    pub max_stretch_ratio: f64,
}

impl AlignmentPolicy {
    /// Short-form content: tight drift tolerance, little slow-motion.
    pub const SHORT_FORM: Self = Self {
        min_coverage_ratio: DEFAULT_MIN_COVERAGE_RATIO,
        max_duration_delta_secs: 0.35,
        max_scene_duration_delta_secs: 1.25,
        max_stretch_ratio: 1.8,
    };

    /// Long-form content: multi-minute narrations synthesized in many pieces
    /// drift more, and clips are stretched further to cover them.
    pub const LONG_FORM: Self = Self {
        min_coverage_ratio: DEFAULT_MIN_COVERAGE_RATIO,
        max_duration_delta_secs: 1.25,
        max_scene_duration_delta_secs: 1.25,
        max_stretch_ratio: 4.5,
    };

    pub fn for_format(format: ContentFormat) -> Self {
        match format {
            ContentFormat::Short => Self::SHORT_FORM,
            ContentFormat::Long => Self::LONG_FORM,
        }
    }
}

impl Default for AlignmentPolicy {
    fn default() -> Self {
        Self::SHORT_FORM
    }
}

/// Mode selection and text splitting parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmenterConfig {
    /// Minimum coverage of the full narration by the scene narrations
    pub scene_coverage_min: f64,

    /// Close a greedy segment once it reaches this fraction of the target
    pub accumulate_fraction: f64,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            scene_coverage_min: DEFAULT_SCENE_COVERAGE_MIN,
            accumulate_fraction: DEFAULT_ACCUMULATE_FRACTION,
        }
    }
}

/// Caption cue parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptionConfig {
    /// Maximum words per cue
    pub words_per_cue: usize,

    /// Minimum cue duration in seconds
    pub min_cue_secs: f64,

    /// Hard cap on cues across the whole video
    pub max_cues: usize,

    /// Upper-case displayed text
    pub uppercase: bool,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            words_per_cue: DEFAULT_WORDS_PER_CUE,
            min_cue_secs: DEFAULT_MIN_CUE_SECS,
            max_cues: DEFAULT_MAX_CUES,
            uppercase: true,
        }
    }
}

/// Complete engine configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EngineConfig {
    pub policy: AlignmentPolicy,
    pub segmenter: SegmenterConfig,
    pub captions: CaptionConfig,
}

impl EngineConfig {
    /// Default configuration with the policy preset for `format`.
    pub fn for_format(format: ContentFormat) -> Self {
        Self {
            policy: AlignmentPolicy::for_format(format),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_form_relaxes_clip_driven_thresholds() {
        let short = AlignmentPolicy::for_format(ContentFormat::Short);
        let long = AlignmentPolicy::for_format(ContentFormat::Long);

        assert!(long.max_duration_delta_secs > short.max_duration_delta_secs);
        assert!(long.max_stretch_ratio > short.max_stretch_ratio);
        assert_eq!(
            long.max_scene_duration_delta_secs,
            short.max_scene_duration_delta_secs
        );
    }
}

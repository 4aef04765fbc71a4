//! Chooses between scene-driven and clip-driven segmentation.

use crate::config::SegmenterConfig;
use crate::text::coverage_ratio;
use crate::types::{Script, SegmentationMode};

/// Outcome of mode selection for one assembly attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeDecision {
    pub mode: SegmentationMode,
    /// Number of clips the timeline will use
    pub clip_count: usize,
}

/// Decide the segmentation mode.
///
/// Scene-driven applies when there are at least as many clips as scenes
/// (extras are truncated), every scene has narration, and either every scene
/// has pre-rendered audio or the scene narrations cover the full narration.
/// Everything else is clip-driven over all available clips. Never fails.
pub fn select_mode(
    script: &Script,
    available_clips: usize,
    prerendered_audio: bool,
    config: &SegmenterConfig,
) -> ModeDecision {
    let clip_driven = ModeDecision {
        mode: SegmentationMode::ClipDriven,
        clip_count: available_clips,
    };

    let scene_count = script.scenes.len();
    if scene_count == 0 || available_clips < scene_count {
        tracing::debug!(scene_count, available_clips, "not enough clips for scenes");
        return clip_driven;
    }

    let narrations: Option<Vec<&str>> = script
        .scenes
        .iter()
        .map(|scene| scene.narration_text())
        .collect();
    let Some(narrations) = narrations else {
        tracing::debug!("some scenes lack narration");
        return clip_driven;
    };

    if !prerendered_audio {
        let coverage = coverage_ratio(&narrations, &script.narration);
        if coverage < config.scene_coverage_min {
            tracing::debug!(coverage, "scene narration does not cover full narration");
            return clip_driven;
        }
    }

    if available_clips > scene_count {
        tracing::info!(
            scene_count,
            available_clips,
            "truncating extra clips to scene count"
        );
    }

    ModeDecision {
        mode: SegmentationMode::SceneDriven,
        clip_count: scene_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scene;

    fn script(narration: &str, scenes: &[Option<&str>]) -> Script {
        Script {
            narration: narration.to_string(),
            scenes: scenes
                .iter()
                .map(|n| Scene {
                    narration: n.map(str::to_string),
                })
                .collect(),
            ..Script::default()
        }
    }

    fn select(script: &Script, clips: usize, prerendered: bool) -> ModeDecision {
        select_mode(script, clips, prerendered, &SegmenterConfig::default())
    }

    #[test]
    fn scene_driven_when_clips_match_and_narration_covers() {
        let script = script("One two. Three four.", &[Some("One two."), Some("Three four.")]);

        let decision = select(&script, 2, false);

        assert_eq!(decision.mode, SegmentationMode::SceneDriven);
        assert_eq!(decision.clip_count, 2);
    }

    #[test]
    fn extra_clips_are_truncated() {
        let script = script("One two. Three four.", &[Some("One two."), Some("Three four.")]);

        let decision = select(&script, 5, false);

        assert_eq!(decision.mode, SegmentationMode::SceneDriven);
        assert_eq!(decision.clip_count, 2);
    }

    #[test]
    fn clip_driven_when_clips_are_missing() {
        let script = script("One two. Three four.", &[Some("One two."), Some("Three four.")]);

        let decision = select(&script, 1, true);

        assert_eq!(decision.mode, SegmentationMode::ClipDriven);
        assert_eq!(decision.clip_count, 1);
    }

    #[test]
    fn clip_driven_when_a_scene_lacks_narration() {
        let script = script("One two. Three four.", &[Some("One two."), Some("  ")]);

        assert_eq!(select(&script, 2, true).mode, SegmentationMode::ClipDriven);
    }

    #[test]
    fn low_coverage_needs_prerendered_audio() {
        let script = script(
            "One two three four five six seven eight nine ten.",
            &[Some("One two."), Some("Three.")],
        );

        assert_eq!(select(&script, 2, false).mode, SegmentationMode::ClipDriven);
        assert_eq!(select(&script, 2, true).mode, SegmentationMode::SceneDriven);
    }

    #[test]
    fn no_scenes_is_clip_driven() {
        let script = script("Just narration.", &[]);

        let decision = select(&script, 3, false);

        assert_eq!(decision.mode, SegmentationMode::ClipDriven);
        assert_eq!(decision.clip_count, 3);
    }
}

//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use eyre::{Result, ensure};
use narralign::config::{
    AlignmentPolicy, CaptionConfig, DEFAULT_MAX_CUES, DEFAULT_MIN_CUE_SECS, DEFAULT_WORDS_PER_CUE,
};

#[derive(Debug, Parser)]
#[command(name = "narralign")]
#[command(about = "Align narration with video clips and export captions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Segment narration across clips, validate alignment and write captions
    Plan(crate::plan::Args),

    /// Regenerate captions from a persisted segment map
    Captions(crate::captions::Args),
}

/// Caption cue options.
#[derive(clap::Args, Clone, Copy, Debug)]
pub struct CaptionArgs {
    /// Maximum words per caption cue
    #[arg(long, default_value_t = DEFAULT_WORDS_PER_CUE)]
    pub words_per_cue: usize,

    /// Minimum cue duration in seconds
    #[arg(long, default_value_t = DEFAULT_MIN_CUE_SECS)]
    pub min_cue_secs: f64,

    /// Maximum cues for the whole video
    #[arg(long, default_value_t = DEFAULT_MAX_CUES)]
    pub max_cues: usize,

    /// Keep the narration's original casing
    #[arg(long)]
    pub keep_case: bool,

    /// Print the first and last cues to stdout
    #[arg(long)]
    pub preview: bool,
}

impl TryFrom<CaptionArgs> for CaptionConfig {
    type Error = eyre::Error;

    fn try_from(args: CaptionArgs) -> Result<Self> {
        ensure!(args.words_per_cue > 0, "--words-per-cue must be at least 1");
        ensure!(
            args.min_cue_secs.is_finite() && args.min_cue_secs >= 0.0,
            "--min-cue-secs must be a non-negative number"
        );

        Ok(Self {
            words_per_cue: args.words_per_cue,
            min_cue_secs: args.min_cue_secs,
            max_cues: args.max_cues,
            uppercase: !args.keep_case,
        })
    }
}

/// Overrides for the alignment policy preset chosen by the script format.
#[derive(clap::Args, Clone, Copy, Debug, Default)]
pub struct PolicyArgs {
    /// Minimum narration coverage ratio in clip-driven mode
    #[arg(long)]
    pub min_coverage: Option<f64>,

    /// Maximum timeline/audio duration delta in seconds (clip-driven)
    #[arg(long)]
    pub max_duration_delta: Option<f64>,

    /// Maximum timeline/audio duration delta in seconds (scene-driven)
    #[arg(long)]
    pub max_scene_duration_delta: Option<f64>,

    /// Maximum segment-over-clip stretch ratio
    #[arg(long)]
    pub max_stretch: Option<f64>,
}

impl PolicyArgs {
    /// Apply the overrides on top of a preset.
    pub fn apply(&self, preset: AlignmentPolicy) -> AlignmentPolicy {
        AlignmentPolicy {
            min_coverage_ratio: self.min_coverage.unwrap_or(preset.min_coverage_ratio),
            max_duration_delta_secs: self
                .max_duration_delta
                .unwrap_or(preset.max_duration_delta_secs),
            max_scene_duration_delta_secs: self
                .max_scene_duration_delta
                .unwrap_or(preset.max_scene_duration_delta_secs),
            max_stretch_ratio: self.max_stretch.unwrap_or(preset.max_stretch_ratio),
        }
    }

    /// Reject negative or non-finite overrides.
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.min_coverage,
            self.max_duration_delta,
            self.max_scene_duration_delta,
            self.max_stretch,
        ];
        ensure!(
            values.iter().flatten().all(|v| v.is_finite() && *v >= 0.0),
            "policy overrides must be non-negative numbers"
        );
        Ok(())
    }
}

/// Execute CLI command - separated for testing.
pub fn run_cli(cli: Cli) -> Result<()> {
    tracing::debug!(?cli, "parsed arguments");

    match cli.command {
        Commands::Plan(args) => crate::plan::execute(args.try_into()?),
        Commands::Captions(args) => crate::captions::execute(args.try_into()?),
    }
}

//! Plan subcommand - run one assembly attempt over a project directory.
//!
//! Project layout:
//!
//! ```text
//! project/
//! ├── script.json            narration, scenes and format
//! ├── clips/clip_{i}.mp4     or .mov/.webm, or a still image
//! ├── audio/segment_{i}.wav  optional pre-rendered scene narration
//! └── out/                   artifacts, synthesized audio and captions.srt
//! ```

use crate::cli::{CaptionArgs, PolicyArgs};
use crate::srt;
use crate::synth::{CommandSynthesizer, Unconfigured};
use color_eyre::Section;
use eyre::{Context, Result, eyre};
use narralign::artifact::DirSink;
use narralign::assembly::{Assembly, AssemblyInput, Engine, NarrationAudio};
use narralign::config::{AlignmentPolicy, CaptionConfig, EngineConfig};
use narralign::discover::discover_clips;
use narralign::error::Error;
use narralign::probe::MediaProbe;
use narralign::synth::segment_audio_name;
use narralign::traits::SpeechSynthesizer;
use narralign::types::Script;
use narralign::validate::AlignmentBlocked;
use std::path::{Path, PathBuf};

pub const SCRIPT_FILE: &str = "script.json";
pub const CLIPS_DIR: &str = "clips";
pub const PRERENDERED_DIR: &str = "audio";
pub const OUTPUT_DIR: &str = "out";
pub const CAPTIONS_FILE: &str = "captions.srt";

/// CLI arguments for an assembly attempt.
#[derive(clap::Args, Debug)]
pub struct Args {
    /// Project directory containing script.json and clips/
    pub project: PathBuf,

    /// Clip directory (default: <project>/clips)
    #[arg(long)]
    pub clips: Option<PathBuf>,

    /// Output directory (default: <project>/out)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Single narration track to split across segments by word count
    #[arg(long, conflicts_with = "tts_command")]
    pub track: Option<PathBuf>,

    /// TTS command template, split with shell quoting; {output} is replaced
    /// by the WAV path to write and the narration arrives on stdin
    #[arg(long)]
    pub tts_command: Option<String>,

    #[command(flatten)]
    pub policy: PolicyArgs,

    #[command(flatten)]
    pub captions: CaptionArgs,
}

/// Resolved configuration for an assembly attempt.
#[derive(Debug)]
pub struct Config {
    pub script_path: PathBuf,
    pub clips_dir: PathBuf,
    pub prerendered_dir: PathBuf,
    pub output_dir: PathBuf,
    pub track: Option<PathBuf>,
    pub synthesizer: Option<CommandSynthesizer>,
    pub policy: PolicyArgs,
    pub captions: CaptionConfig,
    pub preview: bool,
}

impl TryFrom<Args> for Config {
    type Error = eyre::Error;

    fn try_from(args: Args) -> Result<Self> {
        args.policy.validate()?;

        let synthesizer = args
            .tts_command
            .as_deref()
            .map(CommandSynthesizer::from_template)
            .transpose()?;

        Ok(Self {
            script_path: args.project.join(SCRIPT_FILE),
            clips_dir: args.clips.unwrap_or_else(|| args.project.join(CLIPS_DIR)),
            prerendered_dir: args.project.join(PRERENDERED_DIR),
            output_dir: args.output.unwrap_or_else(|| args.project.join(OUTPUT_DIR)),
            track: args.track,
            synthesizer,
            policy: args.policy,
            captions: args.captions.try_into()?,
            preview: args.captions.preview,
        })
    }
}

pub fn execute(config: Config) -> Result<()> {
    let script = load_script(&config.script_path)?;

    let clips = discover_clips(&config.clips_dir)
        .wrap_err("failed to discover clips")
        .suggestion(format!(
            "add clip_0.mp4, clip_1.mp4, ... to {:?}",
            config.clips_dir.display()
        ))?;

    let audio = narration_audio(&config, &script);
    let engine_config = EngineConfig {
        policy: config.policy.apply(AlignmentPolicy::for_format(script.format)),
        captions: config.captions,
        ..EngineConfig::default()
    };

    tracing::info!(
        script = ?config.script_path.display(),
        clips = clips.len(),
        scenes = script.scenes.len(),
        output = ?config.output_dir.display(),
        "planning assembly"
    );

    let has_synthesizer = config.synthesizer.is_some();
    let mut synthesizer: Box<dyn SpeechSynthesizer> = match config.synthesizer {
        Some(synth) => Box::new(synth),
        None => Box::new(Unconfigured),
    };

    let result = Engine::new(engine_config).assemble(
        AssemblyInput {
            script: &script,
            clips: &clips,
            audio,
            work_dir: &config.output_dir.join("audio"),
        },
        synthesizer.as_mut(),
        &MediaProbe::default(),
        &DirSink::new(&config.output_dir),
    );

    let assembly = match result {
        Ok(assembly) => assembly,
        Err(Error::Blocked(blocked)) => return Err(report_blocked(&blocked)?),
        Err(e @ Error::Synthesis(_)) if !has_synthesizer => {
            return Err(eyre::Report::new(e)
                .wrap_err("narration synthesis failed")
                .suggestion("pass --tts-command, --track or pre-rendered audio/segment_{i}.wav"));
        }
        Err(e) => return Err(eyre::Report::new(e).wrap_err("assembly failed")),
    };

    write_captions(&assembly, &config.output_dir.join(CAPTIONS_FILE), config.preview)
}

/// Load and parse `script.json`.
pub fn load_script(path: &Path) -> Result<Script> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read script: {:?}", path.display()))?;

    serde_json::from_str(&text)
        .wrap_err_with(|| format!("failed to parse script: {:?}", path.display()))
}

/// Pick the narration audio source for this attempt.
fn narration_audio(config: &Config, script: &Script) -> NarrationAudio {
    if let Some(track) = &config.track {
        return NarrationAudio::Track(track.clone());
    }

    match prerendered_segments(&config.prerendered_dir, script.scenes.len()) {
        Some(paths) => {
            tracing::info!(count = paths.len(), "using pre-rendered scene audio");
            NarrationAudio::Prerendered(paths)
        }
        None => NarrationAudio::Synthesize,
    }
}

/// `segment_{i}.wav` for every scene, or `None` if any is missing.
fn prerendered_segments(dir: &Path, scene_count: usize) -> Option<Vec<PathBuf>> {
    if scene_count == 0 {
        return None;
    }

    (0..scene_count)
        .map(|i| dir.join(segment_audio_name(i)))
        .map(|path| path.is_file().then_some(path))
        .collect()
}

/// Print the blocked payload to stdout for retry loops, and build the error.
fn report_blocked(blocked: &AlignmentBlocked) -> Result<eyre::Report> {
    println!("{}", serde_json::to_string_pretty(blocked)?);

    let mut report = eyre!("alignment blocked: {}", blocked.reasons.join(", "));
    if let Some(hint) = &blocked.hint {
        report = report.suggestion(hint.clone());
    }

    Ok(report.note(format!("required files: {}", blocked.required_files.join(", "))))
}

fn write_captions(assembly: &Assembly, output: &Path, preview: bool) -> Result<()> {
    let subtitles = srt::to_subtitles(&assembly.cues);

    tracing::info!(
        path = ?output.display(),
        cues = subtitles.len(),
        narration = ?assembly.narration_track.display(),
        "write srt file"
    );

    std::fs::write(output, srt::display_subtitles(&subtitles))
        .wrap_err_with(|| format!("failed to write srt: {:?}", output.display()))?;

    if preview {
        print!("{}", srt::preview_subtitles(&subtitles, 3, 3));
    }

    Ok(())
}

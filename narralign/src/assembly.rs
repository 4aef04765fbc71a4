//! One assembly attempt: mode selection through persisted artifacts.
//!
//! ```text
//! select mode ─► split narration ─► synthesize/measure ─► build timeline
//!     ─► validate ─► persist map + report ─► captions (approved only)
//! ```

use crate::allocate::{MIN_SEGMENT_SECS, allocate_durations, word_weights};
use crate::artifact::write_artifacts;
use crate::audio::concat_wavs;
use crate::caption::CaptionChunker;
use crate::config::EngineConfig;
use crate::error::{InputError, Result, SynthesisError};
use crate::mode::{ModeDecision, select_mode};
use crate::segment::TextSegmenter;
use crate::synth::synthesize_segments;
use crate::timeline::{TimelineEntry, build_timeline};
use crate::traits::{ArtifactSink, DurationProbe, SpeechSynthesizer};
use crate::types::{CaptionCue, ClipKind, ClipSource, Script, SegmentMap, SegmentationMode};
use crate::validate::{
    AlignmentReport, AlignmentTargets, AlignmentValidator, ensure_alignment_or_block,
};
use std::path::{Path, PathBuf};

/// File name of the concatenated narration track.
pub const NARRATION_TRACK_NAME: &str = "narration.wav";

/// Where the narration audio comes from.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum NarrationAudio {
    /// Synthesize each segment in order
    #[default]
    Synthesize,
    /// One WAV per scene, already rendered; used only in scene-driven mode
    Prerendered(Vec<PathBuf>),
    /// A single track for the whole narration, split by word count
    Track(PathBuf),
}

/// Inputs of one assembly attempt.
#[derive(Clone, Debug)]
pub struct AssemblyInput<'a> {
    pub script: &'a Script,
    /// Contiguous clips starting at index 0
    pub clips: &'a [ClipSource],
    pub audio: NarrationAudio,
    /// Directory for synthesized audio and the narration track
    pub work_dir: &'a Path,
}

/// Approved assembly, ready for the video compositor.
#[derive(Clone, Debug)]
pub struct Assembly {
    pub map: SegmentMap,
    pub report: AlignmentReport,
    pub cues: Vec<CaptionCue>,
    /// Clips in timeline order, truncated to the segment count
    pub clips: Vec<ClipSource>,
    pub narration_track: PathBuf,
}

/// Measured narration for each segment.
struct MeasuredNarration {
    durations: Vec<f64>,
    track: Option<PathBuf>,
    track_secs: f64,
}

/// Segmentation and alignment engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct Engine {
    pub config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Run one assembly attempt.
    ///
    /// The segment map and alignment report are persisted to `sink` whether
    /// or not alignment passes.
    ///
    /// # Errors
    ///
    /// - [`InputError`] for missing or non-contiguous clips, before any synthesis
    /// - [`SynthesisError`] when a segment fails twice or audio cannot be measured
    /// - [`Error::Blocked`](crate::error::Error::Blocked) when alignment fails
    pub fn assemble<S, P, A>(
        &self,
        input: AssemblyInput<'_>,
        synthesizer: &mut S,
        probe: &P,
        sink: &A,
    ) -> Result<Assembly>
    where
        S: SpeechSynthesizer + ?Sized,
        P: DurationProbe + ?Sized,
        A: ArtifactSink + ?Sized,
    {
        check_contiguous(input.clips, input.work_dir)?;

        let script = input.script;
        let prerendered = match &input.audio {
            NarrationAudio::Prerendered(paths) => paths.len() >= script.scenes.len(),
            _ => false,
        };

        let decision = select_mode(
            script,
            input.clips.len(),
            prerendered,
            &self.config.segmenter,
        );
        tracing::info!(
            mode = %decision.mode,
            clips = decision.clip_count,
            scenes = script.scenes.len(),
            "segmentation mode selected"
        );

        let full_narration = script.full_narration();
        let texts = self.segment_texts(script, &full_narration, decision);
        let clips = &input.clips[..decision.clip_count];

        let narration = measure_narration(
            &input.audio,
            decision.mode,
            &texts,
            synthesizer,
            probe,
            input.work_dir,
        )?;

        let entries = texts
            .into_iter()
            .zip(&narration.durations)
            .zip(clips)
            .map(|((text, &duration_sec), clip)| TimelineEntry {
                clip_index: clip.index,
                text,
                duration_sec,
                source: decision.mode,
                source_clip_duration_sec: source_clip_duration(clip, duration_sec, probe),
            })
            .collect();

        let map = SegmentMap::new(decision.mode, narration.track_secs, build_timeline(entries));

        let required_clips = if script.scenes.is_empty() {
            decision.clip_count
        } else {
            script.scenes.len()
        };

        let report = AlignmentValidator::new(self.config.policy).build_alignment_checks(
            &map,
            &AlignmentTargets {
                full_narration: &full_narration,
                measured_audio_sec: narration.track_secs,
                available_clips: input.clips.len(),
                required_clips,
            },
        );

        write_artifacts(sink, &map, &report)?;

        if let Err(blocked) = ensure_alignment_or_block(&report, script.scenes.len()) {
            tracing::warn!(
                reason = %blocked.reason,
                hint = blocked.hint.as_deref().unwrap_or_default(),
                "alignment blocked"
            );
            return Err(blocked.into());
        }

        let cues = CaptionChunker::new(self.config.captions).chunk(&map.segments);

        let narration_track = narration
            .track
            .ok_or_else(|| SynthesisError::EmptyTrack(input.work_dir.join(NARRATION_TRACK_NAME)))?;

        tracing::info!(
            segments = map.clip_count,
            cues = cues.len(),
            duration = map.audio_duration_sec,
            "alignment approved"
        );

        Ok(Assembly {
            map,
            report,
            cues,
            clips: clips.to_vec(),
            narration_track,
        })
    }

    /// Narration text for each clip of the timeline.
    fn segment_texts(
        &self,
        script: &Script,
        full_narration: &str,
        decision: ModeDecision,
    ) -> Vec<String> {
        match decision.mode {
            SegmentationMode::SceneDriven => script.scenes[..decision.clip_count]
                .iter()
                .map(|scene| scene.narration_text().unwrap_or_default().to_string())
                .collect(),
            SegmentationMode::ClipDriven => {
                TextSegmenter::new(self.config.segmenter).split(full_narration, decision.clip_count)
            }
        }
    }
}

fn check_contiguous(clips: &[ClipSource], dir: &Path) -> std::result::Result<(), InputError> {
    if clips.is_empty() {
        return Err(InputError::NoClips(dir.to_path_buf()));
    }

    match clips.iter().enumerate().find(|(i, clip)| clip.index != *i) {
        Some((gap, clip)) => Err(InputError::NonContiguousClips {
            gap,
            found: clip.index,
        }),
        None => Ok(()),
    }
}

/// Natural duration of a clip; still images are rendered at the segment's length.
fn source_clip_duration<P: DurationProbe + ?Sized>(
    clip: &ClipSource,
    segment_secs: f64,
    probe: &P,
) -> Option<f64> {
    match clip.kind {
        ClipKind::Image => Some(segment_secs),
        ClipKind::Video => Some(probe.duration_or_zero(&clip.path)).filter(|&d| d > 0.0),
    }
}

fn measure_narration<S, P>(
    audio: &NarrationAudio,
    mode: SegmentationMode,
    texts: &[String],
    synthesizer: &mut S,
    probe: &P,
    work_dir: &Path,
) -> Result<MeasuredNarration>
where
    S: SpeechSynthesizer + ?Sized,
    P: DurationProbe + ?Sized,
{
    let track_path = work_dir.join(NARRATION_TRACK_NAME);

    let parts: Vec<Option<(PathBuf, f64)>> = match audio {
        NarrationAudio::Track(path) => {
            let track_secs = probe.duration_or_zero(path);
            let durations = allocate_durations(track_secs, &word_weights(texts));
            if durations.is_empty() {
                return Err(SynthesisError::EmptyTrack(path.clone()).into());
            }

            tracing::info!(track_secs, segments = durations.len(), "allocated narration track");

            return Ok(MeasuredNarration {
                durations,
                track: Some(path.clone()),
                track_secs,
            });
        }
        NarrationAudio::Prerendered(paths) if mode == SegmentationMode::SceneDriven => paths
            .iter()
            .take(texts.len())
            .enumerate()
            .map(|(index, path)| {
                let secs = probe.duration_or_zero(path);
                if secs > 0.0 {
                    Ok(Some((path.clone(), secs)))
                } else {
                    Err(SynthesisError::ZeroDuration {
                        index,
                        path: path.clone(),
                    })
                }
            })
            .collect::<std::result::Result<_, _>>()?,
        _ => synthesize_segments(synthesizer, probe, texts, work_dir)?
            .into_iter()
            .map(|segment| segment.map(|s| (s.path, s.duration_sec)))
            .collect(),
    };

    let durations = parts
        .iter()
        .map(|part| part.as_ref().map_or(MIN_SEGMENT_SECS, |(_, secs)| *secs))
        .collect();

    let files: Vec<PathBuf> = parts.into_iter().flatten().map(|(path, _)| path).collect();
    if files.is_empty() {
        tracing::warn!("no narration audio produced");
        return Ok(MeasuredNarration {
            durations,
            track: None,
            track_secs: 0.0,
        });
    }

    std::fs::create_dir_all(work_dir).map_err(SynthesisError::from)?;
    concat_wavs(&files, &track_path)?;
    let track_secs = probe.duration_or_zero(&track_path);
    if track_secs <= 0.0 {
        return Err(SynthesisError::EmptyTrack(track_path).into());
    }

    Ok(MeasuredNarration {
        durations,
        track: Some(track_path),
        track_secs,
    })
}

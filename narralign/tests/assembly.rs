//! End-to-end assembly attempts with WAV fixtures and fake collaborators.

use hound::{SampleFormat, WavSpec, WavWriter};
use narralign::artifact::{
    ALIGNMENT_REPORT_KEY, DirSink, SEGMENT_MAP_KEY, load_alignment_report, load_segment_map,
};
use narralign::assembly::{AssemblyInput, Engine, NarrationAudio};
use narralign::config::EngineConfig;
use narralign::discover::discover_clips;
use narralign::error::{Error, SynthesisError};
use narralign::probe::WavProbe;
use narralign::traits::{BoxError, DurationProbe, SpeechSynthesizer, SynthesisRequest};
use narralign::types::{Scene, Script, SegmentationMode};
use narralign::validate::Reason;
use std::path::Path;

const SAMPLE_RATE: u32 = 16_000;
const SECS_PER_WORD: f64 = 0.4;

fn write_silence(path: &Path, secs: f64) -> eyre::Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for _ in 0..(secs * SAMPLE_RATE as f64).round() as usize {
        writer.write_sample(0i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Speaks every word for a fixed 0.4 seconds.
#[derive(Default)]
struct SilentVoice {
    requests: usize,
}

impl SpeechSynthesizer for SilentVoice {
    fn synthesize(&mut self, request: &SynthesisRequest<'_>) -> Result<(), BoxError> {
        self.requests += 1;
        let words = request.text.split_whitespace().count();
        write_silence(request.output, words as f64 * SECS_PER_WORD)?;
        Ok(())
    }
}

struct BrokenVoice;

impl SpeechSynthesizer for BrokenVoice {
    fn synthesize(&mut self, _: &SynthesisRequest<'_>) -> Result<(), BoxError> {
        Err("voice provider offline".into())
    }
}

/// WAV headers for audio, a fixed length for every clip.
struct FixtureProbe {
    clip_secs: f64,
}

impl DurationProbe for FixtureProbe {
    fn duration_secs(&self, path: &Path) -> Result<f64, BoxError> {
        if path.extension().is_some_and(|ext| ext == "wav") {
            WavProbe.duration_secs(path)
        } else {
            Ok(self.clip_secs)
        }
    }
}

struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    fn with_clips(count: usize) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("clips")).unwrap();
        for i in 0..count {
            std::fs::write(dir.path().join(format!("clips/clip_{i}.mp4")), b"").unwrap();
        }
        Self { dir }
    }

    fn path(&self, rel: &str) -> std::path::PathBuf {
        self.dir.path().join(rel)
    }

    fn assemble(
        &self,
        script: &Script,
        audio: NarrationAudio,
        synthesizer: &mut dyn SpeechSynthesizer,
    ) -> narralign::error::Result<narralign::assembly::Assembly> {
        let clips = discover_clips(&self.path("clips"))?;
        let work_dir = self.path("audio");

        Engine::new(EngineConfig::for_format(script.format)).assemble(
            AssemblyInput {
                script,
                clips: &clips,
                audio,
                work_dir: &work_dir,
            },
            synthesizer,
            &FixtureProbe { clip_secs: 10.0 },
            &DirSink::new(self.dir.path()),
        )
    }
}

fn scene_script(narrations: &[&str]) -> Script {
    Script {
        narration: narrations.join(" "),
        scenes: narrations.iter().map(|n| Scene::new(*n)).collect(),
        ..Script::default()
    }
}

#[test]
fn scene_driven_attempt_is_approved() {
    let project = Project::with_clips(2);
    let script = scene_script(&["The sun rises.", "Birds sing loudly."]);
    let mut voice = SilentVoice::default();

    let assembly = project
        .assemble(&script, NarrationAudio::Synthesize, &mut voice)
        .unwrap();

    assert_eq!(voice.requests, 2);
    assert_eq!(assembly.map.mode, SegmentationMode::SceneDriven);
    assert_eq!(assembly.map.clip_count, 2);
    assert!((assembly.map.audio_duration_sec - 2.4).abs() < 0.001);

    let ends: Vec<f64> = assembly.map.segments.iter().map(|s| s.end_sec).collect();
    assert_eq!(ends, [1.2, 2.4]);

    assert_eq!(assembly.cues.len(), 2);
    assert_eq!(assembly.cues[0].text, "THE SUN RISES");
    assert_eq!(assembly.cues[1].end_sec, 2.4);

    assert!(assembly.narration_track.is_file());
    let sink = DirSink::new(project.dir.path());
    assert_eq!(load_segment_map(&sink).unwrap(), assembly.map);
    assert!(load_alignment_report(&sink).unwrap().passed);
}

#[test]
fn extra_clips_are_truncated_to_scene_count() {
    let project = Project::with_clips(3);
    let script = scene_script(&["First scene here.", "Second scene here."]);

    let assembly = project
        .assemble(&script, NarrationAudio::Synthesize, &mut SilentVoice::default())
        .unwrap();

    assert_eq!(assembly.map.clip_count, 2);
    assert_eq!(assembly.clips.len(), 2);
}

#[test]
fn missing_clips_block_and_still_write_artifacts() {
    let project = Project::with_clips(2);
    let script = scene_script(&["One two three.", "Four five six.", "Seven eight nine."]);

    let err = project
        .assemble(&script, NarrationAudio::Synthesize, &mut SilentVoice::default())
        .unwrap_err();

    let blocked = err.as_blocked().expect("alignment should block");
    assert_eq!(blocked.reason, "insufficient_clips");
    assert_eq!(
        blocked.required_files,
        ["clip_0.mp4", "clip_1.mp4", "clip_2.mp4"]
    );
    assert!(blocked.hint.as_deref().unwrap().contains("clip_2.mp4"));

    let sink = DirSink::new(project.dir.path());
    let map = load_segment_map(&sink).unwrap();
    assert_eq!(map.mode, SegmentationMode::ClipDriven);
    assert_eq!(map.clip_count, 2);

    let report = load_alignment_report(&sink).unwrap();
    assert!(!report.passed);
    assert_eq!(report.reasons, [Reason::InsufficientClips]);
    assert_eq!(report.checks.coverage_ratio, 1.0);
}

#[test]
fn single_track_is_split_by_word_count() {
    let project = Project::with_clips(2);
    let track = project.path("voiceover.wav");
    write_silence(&track, 3.0).unwrap();

    let script = Script {
        narration: "Alpha beta gamma delta. Epsilon zeta.".to_string(),
        ..Script::default()
    };
    let mut voice = SilentVoice::default();

    let assembly = project
        .assemble(&script, NarrationAudio::Track(track.clone()), &mut voice)
        .unwrap();

    assert_eq!(voice.requests, 0);
    assert_eq!(assembly.narration_track, track);
    assert_eq!(assembly.map.mode, SegmentationMode::ClipDriven);

    let durations: Vec<f64> = assembly.map.segments.iter().map(|s| s.duration_sec).collect();
    assert_eq!(durations, [1.5, 1.5]);
}

#[test]
fn synthesis_failure_aborts_before_artifacts() {
    let project = Project::with_clips(2);
    let script = scene_script(&["The sun rises.", "Birds sing loudly."]);

    let err = project
        .assemble(&script, NarrationAudio::Synthesize, &mut BrokenVoice)
        .unwrap_err();

    assert!(
        matches!(
            err,
            Error::Synthesis(SynthesisError::Failed { index: 0, attempts: 2, .. })
        ),
        "unexpected error: {err:?}"
    );
    assert!(!project.path(SEGMENT_MAP_KEY).exists());
    assert!(!project.path(ALIGNMENT_REPORT_KEY).exists());
}

#[test]
fn gap_in_clips_is_rejected_before_synthesis() {
    let project = Project::with_clips(1);
    std::fs::write(project.path("clips/clip_2.mp4"), b"").unwrap();
    let mut voice = SilentVoice::default();

    let err = project
        .assemble(&scene_script(&["Hello."]), NarrationAudio::Synthesize, &mut voice)
        .unwrap_err();

    assert!(matches!(err, Error::Input(_)), "unexpected error: {err:?}");
    assert_eq!(voice.requests, 0);
}

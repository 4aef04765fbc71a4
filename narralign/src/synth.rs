//! Sequential per-segment speech synthesis.

use crate::error::SynthesisError;
use crate::traits::{DurationProbe, SpeechSynthesizer, SynthesisRequest};
use std::path::{Path, PathBuf};

/// Attempts per segment: the first call plus one retry.
pub const MAX_ATTEMPTS: usize = 2;

/// A synthesized and measured segment.
#[derive(Clone, Debug, PartialEq)]
pub struct SynthesizedSegment {
    pub index: usize,
    pub path: PathBuf,
    /// Measured duration of the written file
    pub duration_sec: f64,
}

/// File name for one segment's audio.
pub fn segment_audio_name(index: usize) -> String {
    format!("segment_{index}.wav")
}

/// Synthesize every non-blank text in order, one request at a time.
///
/// Blank texts are skipped and yield `None`. A failing segment is retried
/// once; if it fails again, every file written so far is deleted and the
/// whole batch fails.
pub fn synthesize_segments<S, P>(
    synthesizer: &mut S,
    probe: &P,
    texts: &[String],
    out_dir: &Path,
) -> Result<Vec<Option<SynthesizedSegment>>, SynthesisError>
where
    S: SpeechSynthesizer + ?Sized,
    P: DurationProbe + ?Sized,
{
    std::fs::create_dir_all(out_dir)?;

    let mut results = Vec::with_capacity(texts.len());

    for (index, text) in texts.iter().enumerate() {
        if text.trim().is_empty() {
            tracing::warn!(index, "skipping synthesis of empty segment");
            results.push(None);
            continue;
        }

        let output = out_dir.join(segment_audio_name(index));
        let request = SynthesisRequest {
            index,
            text,
            previous_text: index.checked_sub(1).map(|i| texts[i].as_str()),
            next_text: texts.get(index + 1).map(String::as_str),
            output: &output,
        };

        match synthesize_with_retry(synthesizer, probe, &request) {
            Ok(duration_sec) => {
                tracing::debug!(index, duration_sec, "segment synthesized");
                results.push(Some(SynthesizedSegment {
                    index,
                    path: output,
                    duration_sec,
                }));
            }
            Err(e) => {
                let written = results.iter().flatten().map(|s| s.path.as_path());
                remove_partial_audio(written.chain([output.as_path()]));
                return Err(e);
            }
        }
    }

    Ok(results)
}

fn synthesize_with_retry<S, P>(
    synthesizer: &mut S,
    probe: &P,
    request: &SynthesisRequest<'_>,
) -> Result<f64, SynthesisError>
where
    S: SpeechSynthesizer + ?Sized,
    P: DurationProbe + ?Sized,
{
    let mut last_error = String::new();

    for attempt in 1..=MAX_ATTEMPTS {
        match synthesizer.synthesize(request) {
            Ok(()) => {
                let duration = probe.duration_or_zero(request.output);
                if duration > 0.0 {
                    return Ok(duration);
                }
                last_error = SynthesisError::ZeroDuration {
                    index: request.index,
                    path: request.output.to_path_buf(),
                }
                .to_string();
            }
            Err(e) => last_error = e.to_string(),
        }

        tracing::warn!(
            index = request.index,
            attempt,
            error = %last_error,
            "segment synthesis failed"
        );
    }

    Err(SynthesisError::Failed {
        index: request.index,
        attempts: MAX_ATTEMPTS,
        message: last_error,
    })
}

fn remove_partial_audio<'a>(paths: impl IntoIterator<Item = &'a Path>) {
    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(path = ?path.display(), "removed partial audio"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = ?path.display(), error = %e, "failed to remove partial audio"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::BoxError;
    use std::collections::HashMap;

    /// Writes a text file whose "duration" is the word count of the request.
    #[derive(Default)]
    struct FakeSynth {
        calls: Vec<(usize, Option<String>, Option<String>)>,
        failures: HashMap<usize, usize>,
    }

    impl SpeechSynthesizer for FakeSynth {
        fn synthesize(&mut self, request: &SynthesisRequest<'_>) -> Result<(), BoxError> {
            self.calls.push((
                request.index,
                request.previous_text.map(str::to_string),
                request.next_text.map(str::to_string),
            ));

            if let Some(left) = self.failures.get_mut(&request.index) {
                if *left > 0 {
                    *left -= 1;
                    return Err("provider unavailable".into());
                }
            }

            let words = request.text.split_whitespace().count();
            std::fs::write(request.output, words.to_string())?;
            Ok(())
        }
    }

    struct FileProbe;

    impl DurationProbe for FileProbe {
        fn duration_secs(&self, path: &Path) -> Result<f64, BoxError> {
            Ok(std::fs::read_to_string(path)?.parse()?)
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn synthesizes_in_order_with_context() {
        let dir = tempfile::tempdir().unwrap();
        let mut synth = FakeSynth::default();

        let results =
            synthesize_segments(&mut synth, &FileProbe, &texts(&["a b", "c", "d e f"]), dir.path())
                .unwrap();

        let durations: Vec<f64> = results.iter().flatten().map(|s| s.duration_sec).collect();
        assert_eq!(durations, [2.0, 1.0, 3.0]);
        assert_eq!(
            synth.calls,
            [
                (0, None, Some("c".to_string())),
                (1, Some("a b".to_string()), Some("d e f".to_string())),
                (2, Some("c".to_string()), None),
            ]
        );
    }

    #[test]
    fn retries_once_then_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let mut synth = FakeSynth {
            failures: HashMap::from([(1, 1)]),
            ..FakeSynth::default()
        };

        let results =
            synthesize_segments(&mut synth, &FileProbe, &texts(&["a", "b c"]), dir.path()).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(synth.calls.len(), 3);
    }

    #[test]
    fn second_failure_removes_partial_audio() {
        let dir = tempfile::tempdir().unwrap();
        let mut synth = FakeSynth {
            failures: HashMap::from([(2, 2)]),
            ..FakeSynth::default()
        };

        let err = synthesize_segments(&mut synth, &FileProbe, &texts(&["a", "b", "c"]), dir.path())
            .unwrap_err();

        assert!(
            matches!(err, SynthesisError::Failed { index: 2, attempts: 2, .. }),
            "unexpected error: {err:?}"
        );
        assert!(!dir.path().join("segment_0.wav").exists());
        assert!(!dir.path().join("segment_1.wav").exists());
    }

    #[test]
    fn blank_segments_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut synth = FakeSynth::default();

        let results =
            synthesize_segments(&mut synth, &FileProbe, &texts(&["a", " ", "b"]), dir.path())
                .unwrap();

        assert!(results[1].is_none());
        assert_eq!(synth.calls.len(), 2);
    }

    #[test]
    fn unmeasurable_output_counts_as_failure() {
        struct SilentSynth;

        impl SpeechSynthesizer for SilentSynth {
            fn synthesize(&mut self, request: &SynthesisRequest<'_>) -> Result<(), BoxError> {
                std::fs::write(request.output, "0")?;
                Ok(())
            }
        }

        let dir = tempfile::tempdir().unwrap();

        let err = synthesize_segments(&mut SilentSynth, &FileProbe, &texts(&["a"]), dir.path())
            .unwrap_err();

        assert!(matches!(err, SynthesisError::Failed { index: 0, .. }));
        assert!(!dir.path().join("segment_0.wav").exists());
    }
}

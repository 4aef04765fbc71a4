//! Collaborator traits at the engine boundary.
//!
//! - [`SpeechSynthesizer`]: renders narration text to a WAV file
//! - [`DurationProbe`]: measures the duration of a local media file
//! - [`ArtifactSink`]: stores JSON artifacts under a key

use crate::error::ArtifactError;
use std::path::Path;

/// Error type returned by external collaborators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One synthesis request with neighbouring text for prosody continuity.
#[derive(Clone, Copy, Debug)]
pub struct SynthesisRequest<'a> {
    /// Segment index
    pub index: usize,
    /// Narration to speak
    pub text: &'a str,
    /// Text of the preceding segment, if any
    pub previous_text: Option<&'a str>,
    /// Text of the following segment, if any
    pub next_text: Option<&'a str>,
    /// WAV file to write
    pub output: &'a Path,
}

/// Text-to-speech provider.
///
/// Calls are made strictly one at a time in segment order. Any duration the
/// provider might know is ignored; the written file is measured instead.
pub trait SpeechSynthesizer {
    /// Write synthesized speech for `request.text` to `request.output`.
    ///
    /// Note: Takes `&mut self` so providers can keep session state between calls.
    fn synthesize(&mut self, request: &SynthesisRequest<'_>) -> Result<(), BoxError>;
}

/// Media duration probe.
pub trait DurationProbe {
    /// Duration of the file at `path` in seconds.
    fn duration_secs(&self, path: &Path) -> Result<f64, BoxError>;

    /// Duration, or 0 when the file is unreadable or absent.
    fn duration_or_zero(&self, path: &Path) -> f64 {
        match self.duration_secs(path) {
            Ok(secs) if secs.is_finite() && secs > 0.0 => secs,
            Ok(_) => 0.0,
            Err(e) => {
                tracing::warn!(path = ?path.display(), error = %e, "failed to probe duration");
                0.0
            }
        }
    }
}

/// Durable key-value store for JSON artifacts.
pub trait ArtifactSink {
    /// Store `bytes` under `key`, replacing any previous value.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), ArtifactError>;

    /// Read the value stored under `key`.
    fn get(&self, key: &str) -> Result<Vec<u8>, ArtifactError>;
}

impl<T: SpeechSynthesizer + ?Sized> SpeechSynthesizer for &mut T {
    fn synthesize(&mut self, request: &SynthesisRequest<'_>) -> Result<(), BoxError> {
        (**self).synthesize(request)
    }
}

impl<T: DurationProbe + ?Sized> DurationProbe for &T {
    fn duration_secs(&self, path: &Path) -> Result<f64, BoxError> {
        (**self).duration_secs(path)
    }
}

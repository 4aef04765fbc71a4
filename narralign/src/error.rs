//! Error types for narralign organized by processing stage.

use crate::validate::AlignmentBlocked;
use std::path::PathBuf;
use thiserror::Error;

/// Assembly error variants organized by processing stage.
#[derive(Debug, Error)]
pub enum Error {
    /// Input contract violation, raised before any synthesis work is spent
    #[error(transparent)]
    Input(#[from] InputError),

    /// Speech synthesis stage error
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    /// Artifact persistence error
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Alignment checks failed; recoverable by supplying more input
    #[error(transparent)]
    Blocked(Box<AlignmentBlocked>),
}

impl Error {
    /// Structured blocked payload, if this is an alignment failure.
    pub fn as_blocked(&self) -> Option<&AlignmentBlocked> {
        match self {
            Error::Blocked(blocked) => Some(blocked),
            _ => None,
        }
    }
}

impl From<AlignmentBlocked> for Error {
    fn from(blocked: AlignmentBlocked) -> Self {
        Error::Blocked(Box::new(blocked))
    }
}

/// Input contract violations.
#[derive(Debug, Error)]
pub enum InputError {
    /// No clip found at index 0
    #[error("no clips found in {0:?}")]
    NoClips(PathBuf),

    /// A clip exists past the first missing index
    #[error("clips must be contiguous: clip_{gap} is missing but clip_{found} exists")]
    NonContiguousClips { gap: usize, found: usize },

    /// IO error while reading inputs
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Speech synthesis and narration track errors.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Synthesizer failed on every attempt for one segment
    #[error("synthesis failed for segment {index} after {attempts} attempts: {message}")]
    Failed {
        index: usize,
        attempts: usize,
        message: String,
    },

    /// Synthesized file could not be measured
    #[error("synthesized audio for segment {index} has no measurable duration: {path:?}")]
    ZeroDuration { index: usize, path: PathBuf },

    /// Narration track has no audio to measure
    #[error("narration track is empty or unreadable: {0:?}")]
    EmptyTrack(PathBuf),

    /// Per-segment WAV files disagree on format
    #[error("cannot concatenate {path:?}: expected {expected}, got {got}")]
    FormatMismatch {
        path: PathBuf,
        expected: String,
        got: String,
    },

    /// IO error while handling audio files
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// WAV file format error
    #[error(transparent)]
    Wav(#[from] hound::Error),
}

/// Artifact persistence errors.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// IO error while writing or reading an artifact
    #[error("artifact io error for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for narralign operations.
pub type Result<T> = std::result::Result<T, Error>;

// Nested From implementations for automatic error conversion chains

// hound::Error → SynthesisError → Error
impl From<hound::Error> for Error {
    fn from(e: hound::Error) -> Self {
        Error::Synthesis(SynthesisError::Wav(e))
    }
}

// serde_json::Error → ArtifactError → Error
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Artifact(ArtifactError::Json(e))
    }
}

//! Persists segment maps and alignment reports as JSON artifacts.

use crate::error::ArtifactError;
use crate::traits::ArtifactSink;
use crate::types::SegmentMap;
use crate::validate::AlignmentReport;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Key of the persisted segment map.
pub const SEGMENT_MAP_KEY: &str = "clip_segment_map.json";

/// Key of the persisted alignment report.
pub const ALIGNMENT_REPORT_KEY: &str = "segment_alignment.json";

/// Stores artifacts as files under a root directory.
#[derive(Clone, Debug)]
pub struct DirSink {
    root: PathBuf,
}

impl DirSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path an artifact key maps to.
    pub fn path_of(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl ArtifactSink for DirSink {
    /// Write through a temporary file and rename, so readers never see a
    /// half-written artifact.
    fn put(&self, key: &str, bytes: &[u8]) -> Result<(), ArtifactError> {
        let io_err = |source| ArtifactError::Io {
            key: key.to_string(),
            source,
        };

        std::fs::create_dir_all(&self.root).map_err(io_err)?;

        let path = self.path_of(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, bytes).map_err(io_err)?;
        std::fs::rename(&tmp, &path).map_err(io_err)?;

        Ok(())
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, ArtifactError> {
        std::fs::read(self.path_of(key)).map_err(|source| ArtifactError::Io {
            key: key.to_string(),
            source,
        })
    }
}

/// Encode a value as pretty JSON with a trailing newline.
pub fn to_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, ArtifactError> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Persist the segment map and its alignment report.
///
/// Called for every attempt, passed or failed; a retry overwrites the pair.
pub fn write_artifacts<S: ArtifactSink + ?Sized>(
    sink: &S,
    map: &SegmentMap,
    report: &AlignmentReport,
) -> Result<(), ArtifactError> {
    sink.put(SEGMENT_MAP_KEY, &to_json_bytes(map)?)?;
    sink.put(ALIGNMENT_REPORT_KEY, &to_json_bytes(report)?)?;

    tracing::info!(
        mode = %map.mode,
        clips = map.clip_count,
        passed = report.passed,
        "segmentation artifacts written"
    );

    Ok(())
}

fn read_json<S: ArtifactSink + ?Sized, T: DeserializeOwned>(
    sink: &S,
    key: &str,
) -> Result<T, ArtifactError> {
    Ok(serde_json::from_slice(&sink.get(key)?)?)
}

/// Load a persisted segment map.
pub fn load_segment_map<S: ArtifactSink + ?Sized>(sink: &S) -> Result<SegmentMap, ArtifactError> {
    read_json(sink, SEGMENT_MAP_KEY)
}

/// Load a persisted alignment report.
pub fn load_alignment_report<S: ArtifactSink + ?Sized>(
    sink: &S,
) -> Result<AlignmentReport, ArtifactError> {
    read_json(sink, ALIGNMENT_REPORT_KEY)
}

/// Load a segment map from an explicit file path.
pub fn read_segment_map(path: &Path) -> Result<SegmentMap, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        key: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_slice(&bytes)?)
}

//! Media duration probes.

use crate::audio::wav_duration_secs;
use crate::traits::{BoxError, DurationProbe};
use std::path::Path;
use std::process::Command;

/// Reads durations from WAV headers.
#[derive(Clone, Copy, Debug, Default)]
pub struct WavProbe;

impl DurationProbe for WavProbe {
    fn duration_secs(&self, path: &Path) -> Result<f64, BoxError> {
        Ok(wav_duration_secs(path)?)
    }
}

/// Asks `ffprobe` for the container duration.
#[derive(Clone, Debug)]
pub struct FfprobeProbe {
    pub program: String,
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self {
            program: "ffprobe".to_string(),
        }
    }
}

impl DurationProbe for FfprobeProbe {
    fn duration_secs(&self, path: &Path) -> Result<f64, BoxError> {
        let output = Command::new(&self.program)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("{} failed: {}", self.program, stderr.trim()).into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.trim().parse::<f64>()?)
    }
}

/// Uses the WAV header for `.wav` files and `ffprobe` for everything else.
#[derive(Clone, Debug, Default)]
pub struct MediaProbe {
    pub wav: WavProbe,
    pub ffprobe: FfprobeProbe,
}

impl DurationProbe for MediaProbe {
    fn duration_secs(&self, path: &Path) -> Result<f64, BoxError> {
        let is_wav = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));

        if is_wav {
            self.wav.duration_secs(path)
        } else {
            self.ffprobe.duration_secs(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_probes_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.wav");

        assert!(WavProbe.duration_secs(&path).is_err());
        assert_eq!(WavProbe.duration_or_zero(&path), 0.0);
    }

    #[test]
    fn missing_ffprobe_binary_probes_as_zero() {
        let probe = FfprobeProbe {
            program: "narralign-test-no-such-ffprobe".to_string(),
        };

        assert_eq!(probe.duration_or_zero(Path::new("clip_0.mp4")), 0.0);
    }
}

//! WAV measurement and concatenation utilities.

use crate::error::SynthesisError;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::{Path, PathBuf};

/// Duration of a WAV file in seconds, read from its header.
pub fn wav_duration_secs(path: impl AsRef<Path>) -> Result<f64, hound::Error> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();

    // duration() counts frames, independent of channel count
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

/// Concatenate WAV files sharing one format into `output`.
///
/// # Errors
///
/// Returns [`SynthesisError::FormatMismatch`] when a part's format differs
/// from the first part's.
pub fn concat_wavs(parts: &[PathBuf], output: &Path) -> Result<(), SynthesisError> {
    let Some(first) = parts.first() else {
        return Err(SynthesisError::EmptyTrack(output.to_path_buf()));
    };

    let spec = WavReader::open(first)?.spec();
    let mut writer = WavWriter::create(output, spec)?;

    for part in parts {
        let reader = WavReader::open(part)?;
        let part_spec = reader.spec();

        if !same_format(&spec, &part_spec) {
            return Err(SynthesisError::FormatMismatch {
                path: part.clone(),
                expected: describe(&spec),
                got: describe(&part_spec),
            });
        }

        match spec.sample_format {
            SampleFormat::Float => {
                for sample in reader.into_samples::<f32>() {
                    writer.write_sample(sample?)?;
                }
            }
            SampleFormat::Int => {
                for sample in reader.into_samples::<i32>() {
                    writer.write_sample(sample?)?;
                }
            }
        }
    }

    writer.finalize()?;

    tracing::debug!(parts = parts.len(), output = ?output.display(), "concatenated narration");

    Ok(())
}

fn same_format(a: &WavSpec, b: &WavSpec) -> bool {
    a.channels == b.channels
        && a.sample_rate == b.sample_rate
        && a.bits_per_sample == b.bits_per_sample
        && a.sample_format == b.sample_format
}

fn describe(spec: &WavSpec) -> String {
    format!(
        "{}Hz {}ch {}-bit {:?}",
        spec.sample_rate, spec.channels, spec.bits_per_sample, spec.sample_format
    )
}

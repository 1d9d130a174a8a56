//! Composite writing using hound (mono WAV)

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use super::waveform::Waveform;
use crate::config::OutputFormat;
use crate::error::CompositeError;

/// Write a waveform as a mono WAV file
///
/// `Pcm16` clamps samples to [-1.0, 1.0] before quantizing; `Float32` writes them as-is.
///
/// # Errors
///
/// Returns `CompositeError::EncodingError` if the file cannot be created or written
pub fn write_take(
    path: &Path,
    waveform: &Waveform,
    format: OutputFormat,
) -> Result<(), CompositeError> {
    log::debug!(
        "Writing composite: {} ({} samples at {} Hz, {:?})",
        path.display(),
        waveform.len(),
        waveform.sample_rate(),
        format
    );

    let spec = match format {
        OutputFormat::Pcm16 => WavSpec {
            channels: 1,
            sample_rate: waveform.sample_rate(),
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        },
        OutputFormat::Float32 => WavSpec {
            channels: 1,
            sample_rate: waveform.sample_rate(),
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        },
    };

    let mut writer = WavWriter::create(path, spec)?;
    match format {
        OutputFormat::Pcm16 => {
            for &s in waveform.samples() {
                writer.write_sample(pcm16(s))?;
            }
        }
        OutputFormat::Float32 => {
            for &s in waveform.samples() {
                writer.write_sample(s)?;
            }
        }
    }
    writer.finalize()?;

    Ok(())
}

fn pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}

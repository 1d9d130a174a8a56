//! Mono sample buffer with its sample rate

use crate::error::CompositeError;

/// One mono recording: samples normalized to [-1.0, 1.0] plus a sample rate
///
/// Immutable once constructed; the composite is assembled in a separate
/// buffer and wrapped into a `Waveform` when complete.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Wrap samples at the given rate
    ///
    /// # Errors
    ///
    /// Returns `CompositeError::InvalidInput` if `sample_rate` is zero
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, CompositeError> {
        if sample_rate == 0 {
            return Err(CompositeError::InvalidInput(
                "Invalid sample rate".to_string(),
            ));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// All-zero waveform of `len` samples
    pub fn silent(len: usize, sample_rate: u32) -> Result<Self, CompositeError> {
        Self::new(vec![0.0; len], sample_rate)
    }

    /// Sample data
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True if the waveform holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Sample index of `time`, truncated toward zero
    ///
    /// Returns `None` when `time` is negative, non-finite, or past the last sample.
    pub fn time_to_sample(&self, time: f64) -> Option<usize> {
        if !time.is_finite() || time < 0.0 {
            return None;
        }
        let index = (time * self.sample_rate as f64) as usize;
        (index < self.samples.len()).then_some(index)
    }

    /// Number of whole samples spanned by `seconds` at this rate
    pub fn seconds_to_samples(&self, seconds: f64) -> usize {
        seconds_to_samples(seconds, self.sample_rate)
    }
}

/// Number of whole samples spanned by `seconds` at `sample_rate` (truncating, never negative)
pub fn seconds_to_samples(seconds: f64, sample_rate: u32) -> usize {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * sample_rate as f64) as usize
}

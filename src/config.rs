//! Configuration parameters for composite synthesis

use serde::{Deserialize, Serialize};

use crate::error::CompositeError;

/// How per-hit volumes are averaged across takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VolumeAveraging {
    /// Arithmetic mean of the dB values (reference behavior)
    #[default]
    Decibel,
    /// Mean of linear power, converted to dB once
    Power,
}

/// What to do when takes have different sample rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SampleRatePolicy {
    /// Reject mixed sample rates with `CompositeError::SampleRateMismatch`
    #[default]
    RequireUniform,
    /// Accept mixed rates; the composite uses the rate of the last take
    LastTake,
}

/// Onset detection algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OnsetMethod {
    /// Log-power spectral flux with peak picking (default)
    #[default]
    SpectralFlux,
    /// RMS energy derivative
    EnergyFlux,
}

/// Sample format of the written composite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// 16-bit integer PCM
    #[default]
    Pcm16,
    /// 32-bit IEEE float
    Float32,
}

/// Onset detector parameters
///
/// Peak-picking windows are expressed in seconds and converted to frames
/// with `seconds * sample_rate / hop_size` (floored).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnsetConfig {
    /// Detection algorithm (default: SpectralFlux)
    pub method: OnsetMethod,

    /// STFT frame size (default: 2048)
    pub frame_size: usize,

    /// Hop size between frames (default: 512)
    pub hop_size: usize,

    /// Move each onset back to the preceding energy minimum (default: true)
    pub backtrack: bool,

    /// Peak must exceed the local mean by this much, on the [0, 1] normalized envelope (default: 0.07)
    pub delta: f32,

    /// Look-behind for the local maximum, seconds (default: 0.03)
    pub pre_max: f32,

    /// Look-ahead for the local maximum, seconds (default: 0.0)
    pub post_max: f32,

    /// Look-behind for the local mean, seconds (default: 0.10)
    pub pre_avg: f32,

    /// Look-ahead for the local mean, seconds (default: 0.10)
    pub post_avg: f32,

    /// Minimum spacing between onsets, seconds (default: 0.03)
    pub wait: f32,

    /// Energy-flux threshold relative to the max flux, dB (default: -20.0)
    pub energy_threshold_db: f32,
}

impl Default for OnsetConfig {
    fn default() -> Self {
        Self {
            method: OnsetMethod::SpectralFlux,
            frame_size: 2048,
            hop_size: 512,
            backtrack: true,
            delta: 0.07,
            pre_max: 0.03,
            post_max: 0.0,
            pre_avg: 0.10,
            post_avg: 0.10,
            wait: 0.03,
            energy_threshold_db: -20.0,
        }
    }
}

/// Composite synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeConfig {
    /// Length of each extracted hit segment, seconds (default: 0.2)
    pub segment_duration: f64,

    /// Pre-onset lead-in of each segment, seconds (default: 0.01)
    pub segment_offset: f64,

    /// Volume measurement window after each onset, seconds (default: 0.1)
    pub volume_window: f64,

    /// Silence appended after the last averaged hit, seconds (default: 0.5)
    pub trailing_pad: f64,

    /// Volume averaging domain (default: Decibel)
    pub volume_averaging: VolumeAveraging,

    /// Mixed sample rate handling (default: RequireUniform)
    pub sample_rate_policy: SampleRatePolicy,

    /// Composite sample rate when no take is available (default: 44100)
    pub fallback_sample_rate: u32,

    /// Onset detection parameters
    pub onset: OnsetConfig,

    /// Profile takes on the rayon pool (default: true)
    pub parallel: bool,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            segment_duration: 0.2,
            segment_offset: 0.01,
            volume_window: 0.1,
            trailing_pad: 0.5,
            volume_averaging: VolumeAveraging::Decibel,
            sample_rate_policy: SampleRatePolicy::RequireUniform,
            fallback_sample_rate: 44100,
            onset: OnsetConfig::default(),
            parallel: true,
        }
    }
}

impl CompositeConfig {
    /// Check that every parameter is usable
    ///
    /// # Errors
    ///
    /// Returns `CompositeError::InvalidInput` naming the first bad parameter
    pub fn validate(&self) -> Result<(), CompositeError> {
        let seconds = [
            ("segment_duration", self.segment_duration),
            ("segment_offset", self.segment_offset),
            ("volume_window", self.volume_window),
            ("trailing_pad", self.trailing_pad),
        ];
        for (name, value) in seconds {
            if !value.is_finite() || value < 0.0 {
                return Err(CompositeError::InvalidInput(format!(
                    "{} must be a finite, non-negative number of seconds, got {}",
                    name, value
                )));
            }
        }

        if self.segment_duration == 0.0 {
            return Err(CompositeError::InvalidInput(
                "segment_duration must be > 0".to_string(),
            ));
        }

        if self.fallback_sample_rate == 0 {
            return Err(CompositeError::InvalidInput(
                "fallback_sample_rate must be > 0".to_string(),
            ));
        }

        if self.onset.frame_size == 0 {
            return Err(CompositeError::InvalidInput(
                "Frame size must be > 0".to_string(),
            ));
        }

        if self.onset.hop_size == 0 {
            return Err(CompositeError::InvalidInput(
                "Hop size must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

//! Hit detection: onset envelope, peak picking, backtracking
//!
//! # Example
//!
//! ```no_run
//! use take_composite::config::OnsetConfig;
//! use take_composite::features::onset::detector::detect_hits;
//! use take_composite::io::Waveform;
//!
//! let take = Waveform::new(vec![0.0f32; 44100], 44100)?;
//! let hits = detect_hits(&take, &OnsetConfig::default())?;
//! println!("Found {} hits", hits.len());
//! # Ok::<(), take_composite::CompositeError>(())
//! ```

use super::backtrack::backtrack_onsets;
use super::energy_flux::{energy_flux_envelope, pick_energy_peaks};
use super::peak_picking::{normalize_envelope, pick_peaks, PeakPickParams};
use super::spectral_flux::spectral_flux_envelope;
use crate::config::{OnsetConfig, OnsetMethod};
use crate::error::CompositeError;
use crate::io::Waveform;

/// Detect hit times in a take
///
/// # Returns
///
/// Onset times in seconds from the start of the waveform, strictly increasing.
/// Empty when no onsets are found (silence, too-short audio); that is not an error.
///
/// # Errors
///
/// Returns `CompositeError::InvalidInput` if the frame or hop size is zero
pub fn detect_hits(waveform: &Waveform, config: &OnsetConfig) -> Result<Vec<f64>, CompositeError> {
    let sample_rate = waveform.sample_rate();

    let (envelope, peaks) = match config.method {
        OnsetMethod::SpectralFlux => {
            let envelope =
                spectral_flux_envelope(waveform.samples(), config.frame_size, config.hop_size)?;
            let peaks = match normalize_envelope(&envelope) {
                Some(normalized) => {
                    pick_peaks(&normalized, &PeakPickParams::from_config(config, sample_rate))
                }
                None => Vec::new(),
            };
            (envelope, peaks)
        }
        OnsetMethod::EnergyFlux => {
            let envelope =
                energy_flux_envelope(waveform.samples(), config.frame_size, config.hop_size)?;
            let peaks = pick_energy_peaks(&envelope, config.energy_threshold_db);
            (envelope, peaks)
        }
    };

    let frames = if config.backtrack {
        backtrack_onsets(&peaks, &envelope)
    } else {
        peaks
    };

    let hits = frames_to_times(&frames, config.hop_size, sample_rate);

    log::debug!(
        "Detected {} hits ({:?}, backtrack={})",
        hits.len(),
        config.method,
        config.backtrack
    );

    Ok(hits)
}

/// Convert frame indices to seconds, dropping repeats so the result strictly increases
pub fn frames_to_times(frames: &[usize], hop_size: usize, sample_rate: u32) -> Vec<f64> {
    let mut times: Vec<f64> = Vec::with_capacity(frames.len());
    let mut last_frame: Option<usize> = None;

    for &frame in frames {
        if last_frame.is_some_and(|last| frame <= last) {
            continue;
        }
        times.push((frame * hop_size) as f64 / sample_rate as f64);
        last_frame = Some(frame);
    }

    times
}

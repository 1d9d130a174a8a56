//! Energy flux onset envelope
//!
//! Detects onsets from the frame-by-frame energy derivative.
//!
//! Algorithm:
//! 1. Divide audio into overlapping frames (frame_size, hop_size)
//! 2. Compute RMS energy per frame
//! 3. Compute energy derivative (flux): E_flux[n] = max(0, E[n] - E[n-1])
//! 4. Threshold relative to the maximum flux and peak-pick
//!
//! Frame `n` starts at sample `n * hop_size`; `E_flux[0]` is defined as 0 so the
//! envelope is indexed by frame, like the spectral flux envelope.

use crate::error::CompositeError;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Compute the energy flux envelope, one value per frame
///
/// # Reference
///
/// Bello, J. P., Daudet, L., Abdallah, S., Duxbury, C., Davies, M., & Sandler, M. B. (2005).
/// A Tutorial on Onset Detection in Music Signals.
/// *IEEE Transactions on Speech and Audio Processing*, 13(5), 1035-1047.
///
/// # Arguments
///
/// * `samples` - Audio samples (mono, normalized to [-1.0, 1.0])
/// * `frame_size` - Frame size for analysis (typically 2048)
/// * `hop_size` - Hop size between frames (typically 512)
///
/// # Returns
///
/// Envelope with one value per frame; empty if the audio is shorter than two frames
///
/// # Errors
///
/// Returns `CompositeError::InvalidInput` if `frame_size` or `hop_size` is zero
pub fn energy_flux_envelope(
    samples: &[f32],
    frame_size: usize,
    hop_size: usize,
) -> Result<Vec<f32>, CompositeError> {
    if frame_size == 0 {
        return Err(CompositeError::InvalidInput(
            "Frame size must be > 0".to_string(),
        ));
    }

    if hop_size == 0 {
        return Err(CompositeError::InvalidInput(
            "Hop size must be > 0".to_string(),
        ));
    }

    if samples.len() < frame_size {
        log::debug!(
            "Frame size ({}) larger than audio length ({}), empty energy envelope",
            frame_size,
            samples.len()
        );
        return Ok(Vec::new());
    }

    let num_frames = (samples.len() - frame_size) / hop_size + 1;
    if num_frames < 2 {
        // Need at least 2 frames to compute flux
        return Ok(Vec::new());
    }

    let frame_energies: Vec<f32> = (0..num_frames)
        .map(|i| {
            let start = i * hop_size;
            let frame = &samples[start..start + frame_size];
            let sum_sq: f32 = frame.iter().map(|&x| x * x).sum();
            (sum_sq / frame_size as f32).sqrt()
        })
        .collect();

    let mut envelope = Vec::with_capacity(num_frames);
    envelope.push(0.0);
    envelope.extend(
        frame_energies
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).max(0.0)),
    );

    Ok(envelope)
}

/// Pick local maxima of the energy flux envelope above a relative threshold
///
/// A frame is a peak if it rises above its left neighbor, is not below its right
/// neighbor, and exceeds `max_flux * 10^(threshold_db / 20)`. The last frame only
/// needs to rise above its left neighbor.
///
/// # Returns
///
/// Frame indices of peaks, ascending
pub fn pick_energy_peaks(envelope: &[f32], threshold_db: f32) -> Vec<usize> {
    if envelope.len() < 2 {
        return Vec::new();
    }

    let max_flux = envelope.iter().copied().fold(0.0f32, f32::max);
    if max_flux <= EPSILON {
        log::debug!("All energy flux values are zero, no onsets detected");
        return Vec::new();
    }

    let threshold_linear = max_flux * 10.0_f32.powf(threshold_db / 20.0);

    log::debug!(
        "Energy flux: max={:.6}, threshold={:.6} ({:.1} dB)",
        max_flux,
        threshold_linear,
        threshold_db
    );

    let last = envelope.len() - 1;
    let mut peaks: Vec<usize> = (1..last)
        .filter(|&i| {
            let flux = envelope[i];
            // >= on the right so a plateau still yields its first frame
            flux > threshold_linear && flux > envelope[i - 1] && flux >= envelope[i + 1]
        })
        .collect();

    if envelope[last] > threshold_linear && envelope[last] > envelope[last - 1] {
        peaks.push(last);
    }

    peaks
}

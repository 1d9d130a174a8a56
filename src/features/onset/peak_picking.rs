//! Onset peak picking on a normalized strength envelope
//!
//! A frame `n` is an onset if all of the following hold:
//!
//! 1. `x[n] == max(x[n - pre_max ..= n + post_max - 1])`
//! 2. `x[n] >= mean(x[n - pre_avg ..= n + post_avg - 1]) + delta`
//! 3. `n` is more than `wait` frames after the previous onset
//!
//! Windows are clipped to the envelope bounds.
//!
//! # Reference
//!
//! Böck, S., Krebs, F., & Schedl, M. (2012). Evaluating the Online Capabilities of
//! Onset Detection Methods. *Proceedings of the 13th International Society for Music
//! Information Retrieval Conference (ISMIR)*.

use crate::config::OnsetConfig;

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Peak picking windows, in frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakPickParams {
    /// Frames before `n` in the max window
    pub pre_max: usize,
    /// Frames from `n` (inclusive) in the max window, at least 1
    pub post_max: usize,
    /// Frames before `n` in the mean window
    pub pre_avg: usize,
    /// Frames from `n` (inclusive) in the mean window, at least 1
    pub post_avg: usize,
    /// Required margin above the local mean
    pub delta: f32,
    /// Minimum frames between onsets
    pub wait: usize,
}

impl PeakPickParams {
    /// Convert second-based settings to frames at the given rate and hop
    pub fn from_config(config: &OnsetConfig, sample_rate: u32) -> Self {
        let frames = |seconds: f32| -> usize {
            let f = (seconds as f64 * sample_rate as f64 / config.hop_size as f64).floor();
            if f.is_finite() && f > 0.0 {
                f as usize
            } else {
                0
            }
        };

        Self {
            pre_max: frames(config.pre_max),
            post_max: frames(config.post_max) + 1,
            pre_avg: frames(config.pre_avg),
            post_avg: frames(config.post_avg) + 1,
            delta: config.delta,
            wait: frames(config.wait),
        }
    }
}

/// Rescale an envelope to [0, 1]
///
/// Returns `None` if the envelope is empty or flat, since a flat envelope has no onsets.
pub fn normalize_envelope(envelope: &[f32]) -> Option<Vec<f32>> {
    let min = envelope.iter().copied().fold(f32::INFINITY, f32::min);
    let max = envelope.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;

    if !range.is_finite() || range <= EPSILON {
        return None;
    }

    Some(envelope.iter().map(|&v| (v - min) / range).collect())
}

/// Pick onset frames from a normalized envelope
///
/// # Returns
///
/// Frame indices, strictly increasing
pub fn pick_peaks(envelope: &[f32], params: &PeakPickParams) -> Vec<usize> {
    let n = envelope.len();
    let mut peaks = Vec::new();
    let mut last_onset: Option<usize> = None;

    for i in 0..n {
        let max_lo = i.saturating_sub(params.pre_max);
        let max_hi = (i + params.post_max.max(1)).min(n);
        let local_max = envelope[max_lo..max_hi]
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        if envelope[i] != local_max {
            continue;
        }

        let avg_lo = i.saturating_sub(params.pre_avg);
        let avg_hi = (i + params.post_avg.max(1)).min(n);
        let window = &envelope[avg_lo..avg_hi];
        let local_mean = window.iter().sum::<f32>() / window.len() as f32;
        if envelope[i] < local_mean + params.delta {
            continue;
        }

        if let Some(last) = last_onset {
            if i <= last + params.wait {
                continue;
            }
        }

        peaks.push(i);
        last_onset = Some(i);
    }

    log::debug!(
        "Peak picking: {} onsets from {} frames (pre_max={}, post_max={}, wait={})",
        peaks.len(),
        n,
        params.pre_max,
        params.post_max,
        params.wait
    );

    peaks
}

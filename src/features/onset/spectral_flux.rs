//! Spectral flux onset strength
//!
//! Onset strength is the mean positive change of the log-power spectrum
//! between consecutive STFT frames. Frames are centered: the signal is
//! zero-padded by `frame_size / 2` on both sides, so frame `t` is centered on
//! sample `t * hop_size`.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::error::CompositeError;

/// Power floor before conversion to dB
const AMIN: f32 = 1e-10;

/// Dynamic range kept below the loudest bin, dB
const TOP_DB: f32 = 80.0;

/// Periodic Hann window
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let angle = 2.0 * std::f32::consts::PI * i as f32 / size as f32;
            0.5 - 0.5 * angle.cos()
        })
        .collect()
}

/// Centered STFT producing one log-power row at a time
struct LogPowerFrames {
    padded: Vec<f32>,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    frame_size: usize,
    hop_size: usize,
    num_frames: usize,
}

impl LogPowerFrames {
    fn new(samples: &[f32], frame_size: usize, hop_size: usize) -> Result<Self, CompositeError> {
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

        let pad = frame_size / 2;
        let mut padded = vec![0.0f32; pad];
        padded.extend_from_slice(samples);
        padded.resize(padded.len() + pad, 0.0);

        let num_frames = if samples.is_empty() || padded.len() < frame_size {
            0
        } else {
            (padded.len() - frame_size) / hop_size + 1
        };

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(frame_size);

        Ok(Self {
            padded,
            window: hann_window(frame_size),
            fft,
            scratch: vec![Complex::new(0.0f32, 0.0); frame_size],
            frame_size,
            hop_size,
            num_frames,
        })
    }

    fn num_bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Unfloored dB power of frame `t`, written into `row`
    fn row_into(&mut self, t: usize, row: &mut Vec<f32>) {
        let offset = t * self.hop_size;
        let frame = &self.padded[offset..offset + self.frame_size];
        for ((slot, &x), &w) in self.scratch.iter_mut().zip(frame).zip(&self.window) {
            *slot = Complex::new(x * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        let bins = self.num_bins();
        row.clear();
        row.extend(
            self.scratch[..bins]
                .iter()
                .map(|c| 10.0 * (c.re * c.re + c.im * c.im).max(AMIN).log10()),
        );
    }

    /// Loudest bin over all frames, dB
    fn max_db(&mut self) -> f32 {
        let mut row = Vec::with_capacity(self.num_bins());
        let mut max_db = f32::NEG_INFINITY;
        for t in 0..self.num_frames {
            self.row_into(t, &mut row);
            max_db = row.iter().copied().fold(max_db, f32::max);
        }
        max_db
    }
}

/// Spectral flux onset strength envelope, one value per frame
///
/// `envelope[0]` is 0; `envelope[t]` is the mean over bins of
/// `max(0, S[t] - S[t - 1])` on the log-power spectrogram, floored at
/// 80 dB below its loudest bin.
///
/// Runs the STFT twice (once for the floor, once for the flux) so only two
/// spectrum rows are held at a time.
///
/// # Reference
///
/// Böck, S., & Widmer, G. (2013). Maximum Filter Vibrato Suppression for Onset Detection.
/// *Proceedings of the 16th International Conference on Digital Audio Effects (DAFx)*.
///
/// # Errors
///
/// Returns `CompositeError::InvalidInput` if `frame_size` or `hop_size` is zero
pub fn spectral_flux_envelope(
    samples: &[f32],
    frame_size: usize,
    hop_size: usize,
) -> Result<Vec<f32>, CompositeError> {
    let mut frames = LogPowerFrames::new(samples, frame_size, hop_size)?;

    if frames.num_frames == 0 {
        return Ok(Vec::new());
    }

    let floor = frames.max_db() - TOP_DB;
    let bins = frames.num_bins();
    let mut prev = Vec::with_capacity(bins);
    let mut cur = Vec::with_capacity(bins);

    let mut envelope = Vec::with_capacity(frames.num_frames);
    envelope.push(0.0);

    frames.row_into(0, &mut prev);
    for t in 1..frames.num_frames {
        frames.row_into(t, &mut cur);
        let rise: f32 = cur
            .iter()
            .zip(&prev)
            .map(|(&c, &p)| (c.max(floor) - p.max(floor)).max(0.0))
            .sum();
        envelope.push(rise / bins as f32);
        std::mem::swap(&mut prev, &mut cur);
    }

    log::debug!(
        "Spectral flux envelope: {} frames (frame={}, hop={})",
        envelope.len(),
        frame_size,
        hop_size
    );

    Ok(envelope)
}

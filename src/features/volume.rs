//! Per-hit loudness measurement
//!
//! Loudness is the mean squared amplitude over a forward window starting at the
//! hit time, in dB. The window captures the attack and decay after the onset,
//! not the silence before it.

use crate::io::Waveform;

/// Mean-square floor applied before the log
pub const AMPLITUDE_FLOOR: f64 = 1e-10;

/// Lowest value `volume_at_time` can return, dB
pub const MIN_VOLUME_DB: f64 = -100.0;

/// Loudness in dB of the window starting at `time`
///
/// The window spans `window_seconds * sample_rate` samples (at least one) and is
/// cut short at the end of the buffer without padding.
///
/// # Returns
///
/// `None` if `time` falls outside the waveform; otherwise a finite value `>= -100.0`
pub fn volume_at_time(waveform: &Waveform, time: f64, window_seconds: f64) -> Option<f64> {
    let start = waveform.time_to_sample(time)?;
    let window_len = waveform.seconds_to_samples(window_seconds).max(1);
    let end = (start + window_len).min(waveform.len());

    let window = &waveform.samples()[start..end];
    let mean_square =
        window.iter().map(|&s| s as f64 * s as f64).sum::<f64>() / window.len() as f64;

    Some(power_to_db(mean_square))
}

/// Convert a mean-square amplitude to dB, flooring at `AMPLITUDE_FLOOR`
pub fn power_to_db(power: f64) -> f64 {
    let power = if power.is_finite() {
        power.max(AMPLITUDE_FLOOR)
    } else {
        AMPLITUDE_FLOOR
    };
    10.0 * power.log10()
}

/// Convert dB back to mean-square amplitude
pub fn db_to_power(db: f64) -> f64 {
    10.0_f64.powf(db / 10.0)
}

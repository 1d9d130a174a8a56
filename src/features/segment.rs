//! Hit segment extraction
//!
//! A segment spans `duration` seconds centered on `time - offset`, so it starts
//! `offset + duration / 2` before the detected onset and keeps a short lead-in
//! before the attack.

use crate::io::Waveform;

/// Borrow the segment around a hit
///
/// The start sample is `floor((time - offset - duration / 2) * sample_rate)` and the
/// nominal length is `round(duration * sample_rate)`; both ends are clamped to the
/// waveform, so the result is never longer than the nominal length.
///
/// # Returns
///
/// The clamped window, or an empty slice if nothing of it lies inside the waveform
pub fn extract_hit(waveform: &Waveform, time: f64, duration: f64, offset: f64) -> &[f32] {
    let sample_rate = waveform.sample_rate() as f64;
    let start = ((time - offset - duration / 2.0) * sample_rate).floor();
    let len = (duration * sample_rate).round();

    if !start.is_finite() || !len.is_finite() || len <= 0.0 {
        return &[];
    }

    let n = waveform.len() as f64;
    let lo = start.clamp(0.0, n) as usize;
    let hi = (start + len).clamp(0.0, n) as usize;

    if hi <= lo {
        return &[];
    }

    &waveform.samples()[lo..hi]
}

/// Nominal segment length in samples before clamping
pub fn segment_len(duration: f64, sample_rate: u32) -> usize {
    let len = (duration * sample_rate as f64).round();
    if len.is_finite() && len > 0.0 {
        len as usize
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize, sample_rate: u32) -> Waveform {
        Waveform::new((0..len).map(|i| i as f32).collect(), sample_rate).unwrap()
    }

    #[test]
    fn test_window_position() {
        let wave = ramp(1000, 100);
        let seg = extract_hit(&wave, 5.0, 0.25, 0.125);
        // start = floor((5.0 - 0.125 - 0.125) * 100) = 475
        assert_eq!(seg.len(), 25);
        assert_eq!(seg[0], 475.0);
        assert_eq!(seg[24], 499.0);
    }

    #[test]
    fn test_clamped_at_start() {
        let wave = ramp(1000, 100);
        let seg = extract_hit(&wave, 0.125, 0.25, 0.125);
        // nominal [-13, 12)
        assert_eq!(seg.len(), 12);
        assert_eq!(seg[0], 0.0);
    }

    #[test]
    fn test_clamped_at_end() {
        let wave = ramp(1000, 100);
        let seg = extract_hit(&wave, 9.99, 0.2, 0.01);
        assert_eq!(*seg.last().unwrap(), 999.0);
        assert!(seg.len() < 20);
    }

    #[test]
    fn test_outside_is_empty() {
        let wave = ramp(100, 100);
        assert!(extract_hit(&wave, 5.0, 0.2, 0.01).is_empty());
        assert!(extract_hit(&wave, -5.0, 0.2, 0.01).is_empty());
        assert!(extract_hit(&wave, f64::NAN, 0.2, 0.01).is_empty());
    }

    #[test]
    fn test_length_never_exceeds_nominal() {
        let wave = ramp(44100, 44100);
        let nominal = segment_len(0.2, 44100);
        for k in 0..200 {
            let t = 0.0037 * k as f64;
            assert!(extract_hit(&wave, t, 0.2, 0.01).len() <= nominal);
        }
    }
}

//! Channel mixing utilities (multi-channel to mono conversion)

/// Average interleaved frames down to one channel
///
/// # Arguments
///
/// * `interleaved` - Samples laid out frame by frame (`L R L R ...` for stereo)
/// * `channels` - Number of channels per frame
///
/// # Returns
///
/// Mono samples, one per complete frame. A trailing partial frame is dropped.
pub fn interleaved_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => interleaved.to_vec(),
        n => interleaved
            .chunks_exact(n)
            .map(|frame| frame.iter().sum::<f32>() / n as f32)
            .collect(),
    }
}

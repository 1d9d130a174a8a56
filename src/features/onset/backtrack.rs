//! Onset backtracking
//!
//! Peak picking marks the frame where the onset strength is highest, which lags
//! the physical attack. Backtracking moves each onset to the closest preceding
//! local minimum of the strength envelope.

/// Local minima of `envelope`, always including frame 0
///
/// Frame `i` is a minimum if `e[i] <= e[i - 1]` and `e[i] < e[i + 1]`.
pub fn local_minima(envelope: &[f32]) -> Vec<usize> {
    let mut minima = vec![0];
    if envelope.len() >= 3 {
        minima.extend(
            (1..envelope.len() - 1)
                .filter(|&i| envelope[i] <= envelope[i - 1] && envelope[i] < envelope[i + 1]),
        );
    }
    minima
}

/// Move each onset frame back to the nearest local minimum at or before it
///
/// # Arguments
///
/// * `onsets` - Onset frames, ascending
/// * `envelope` - Onset strength (or energy) envelope the onsets were picked from
///
/// # Returns
///
/// Backtracked frames, ascending. Two onsets sharing a minimum map to the same frame.
pub fn backtrack_onsets(onsets: &[usize], envelope: &[f32]) -> Vec<usize> {
    let minima = local_minima(envelope);
    onsets
        .iter()
        .map(|&onset| {
            let idx = minima.partition_point(|&m| m <= onset);
            // minima[0] == 0 <= onset, so idx >= 1
            minima[idx.saturating_sub(1)]
        })
        .collect()
}

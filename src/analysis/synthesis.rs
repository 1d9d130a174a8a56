//! Composite synthesis
//!
//! For every averaged hit position, the real hit (from any take, any position)
//! whose volume is closest to that position's average is copied into a silent
//! buffer at the averaged time. Positions are written strictly in increasing
//! order by a single writer; a later segment overwrites an earlier one where
//! they overlap.

use rayon::prelude::*;

use super::profile::TakeProfile;
use super::result::{AveragedHit, HitSelection};
use crate::config::CompositeConfig;
use crate::features::segment::extract_hit;
use crate::io::waveform::seconds_to_samples;
use crate::io::Waveform;

/// A hit chosen by volume, before it is placed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestHit {
    /// Source take index
    pub take: usize,
    /// Hit index within the take
    pub onset: usize,
    /// Onset time within the take, seconds
    pub time: f64,
    /// Hit volume, dB
    pub volume: f64,
    /// Absolute distance to the target volume, dB
    pub diff: f64,
}

/// Find the hit whose volume is closest to `target_db`
///
/// Every hit of every take is considered, not only the shared positions. Scans
/// takes in order, then hits in order, keeping the first strict minimum, so ties
/// go to the earliest take and earliest hit. Hits without a volume are skipped.
pub fn find_closest_hit(profiles: &[TakeProfile], target_db: f64) -> Option<ClosestHit> {
    let mut best: Option<ClosestHit> = None;

    for profile in profiles {
        for (onset, event) in profile.events.iter().enumerate() {
            let Some(volume) = event.volume else {
                continue;
            };
            let diff = (volume - target_db).abs();
            if best.map_or(true, |b| diff < b.diff) {
                best = Some(ClosestHit {
                    take: profile.take,
                    onset,
                    time: event.time,
                    volume,
                    diff,
                });
            }
        }
    }

    best
}

/// Composite length in samples: last averaged time plus the trailing pad
pub fn composite_len(hits: &[AveragedHit], trailing_pad: f64, sample_rate: u32) -> usize {
    let last = hits.iter().map(|h| h.time).fold(0.0f64, f64::max);
    seconds_to_samples(last + trailing_pad, sample_rate)
}

/// Copy `segment` into `buffer` at `dest`, truncated at the buffer end
///
/// # Returns
///
/// Number of samples written
pub fn place_segment(buffer: &mut [f32], segment: &[f32], dest: usize) -> usize {
    if dest >= buffer.len() {
        return 0;
    }
    let end = (dest + segment.len()).min(buffer.len());
    let written = end - dest;
    buffer[dest..end].copy_from_slice(&segment[..written]);
    written
}

/// Assemble the composite buffer
///
/// `takes` and `profiles` must be index-aligned (profile `i` describes take `i`).
/// The buffer is sized once from `hits` and never resized.
///
/// # Returns
///
/// The composite samples and the selection made for each position that had a candidate
pub fn synthesize(
    takes: &[Waveform],
    profiles: &[TakeProfile],
    hits: &[AveragedHit],
    sample_rate: u32,
    config: &CompositeConfig,
) -> (Vec<f32>, Vec<HitSelection>) {
    let mut buffer = vec![0.0f32; composite_len(hits, config.trailing_pad, sample_rate)];

    // The search is independent per position; only the writes are ordered.
    let search = |hit: &AveragedHit| hit.volume.and_then(|v| find_closest_hit(profiles, v));
    let choices: Vec<Option<ClosestHit>> = if config.parallel {
        hits.par_iter().map(search).collect()
    } else {
        hits.iter().map(search).collect()
    };

    let mut selections = Vec::with_capacity(hits.len());

    for (hit, choice) in hits.iter().zip(choices) {
        let Some(choice) = choice else {
            log::warn!(
                "Position {}: no hit with a measurable volume, leaving silence",
                hit.position
            );
            continue;
        };

        let segment = extract_hit(
            &takes[choice.take],
            choice.time,
            config.segment_duration,
            config.segment_offset,
        );
        let dest = (hit.time * sample_rate as f64).round().max(0.0) as usize;
        let written = place_segment(&mut buffer, segment, dest);

        log::debug!(
            "Position {}: take {} hit {} ({:.2} dB, diff {:.2}) -> sample {} ({} samples)",
            hit.position,
            choice.take,
            choice.onset,
            choice.volume,
            choice.diff,
            dest,
            written
        );

        selections.push(HitSelection {
            position: hit.position,
            take: choice.take,
            onset: choice.onset,
            source_time: choice.time,
            source_volume: choice.volume,
            volume_diff: choice.diff,
            dest_sample: dest,
            written,
        });
    }

    (buffer, selections)
}

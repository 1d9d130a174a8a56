//! Per-take onset profiles
//!
//! Each take is analyzed once: hits are detected and their volumes measured.
//! The resulting `OnsetEvent` list is shared by the aligner and the synthesizer,
//! so both stages see the same onsets.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::CompositeConfig;
use crate::error::CompositeError;
use crate::features::onset::detect_hits;
use crate::features::volume::volume_at_time;
use crate::io::Waveform;

/// One detected hit in one take
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OnsetEvent {
    /// Onset time in seconds from the start of the take
    pub time: f64,

    /// Loudness in dB; `None` if the onset lies outside the waveform
    pub volume: Option<f64>,
}

/// All hits of one take, in time order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeProfile {
    /// Index of the take in the slice being profiled
    pub take: usize,

    /// Detected hits, strictly increasing in time
    pub events: Vec<OnsetEvent>,
}

impl TakeProfile {
    /// Number of detected hits
    pub fn hit_count(&self) -> usize {
        self.events.len()
    }
}

/// Detect hits in one take and measure each hit's volume
///
/// # Errors
///
/// Propagates onset detector configuration errors
pub fn profile_take(
    take: usize,
    waveform: &Waveform,
    config: &CompositeConfig,
) -> Result<TakeProfile, CompositeError> {
    let hits = detect_hits(waveform, &config.onset)?;

    let events: Vec<OnsetEvent> = hits
        .into_iter()
        .map(|time| OnsetEvent {
            time,
            volume: volume_at_time(waveform, time, config.volume_window),
        })
        .collect();

    if events.is_empty() {
        log::warn!("Take {}: no hits detected", take);
    } else {
        log::debug!("Take {}: {} hits", take, events.len());
    }

    Ok(TakeProfile {
        take,
        events,
    })
}

/// Profile every take, in input order
///
/// Takes are independent; with `config.parallel` they are profiled on the rayon
/// pool and joined before returning.
///
/// # Errors
///
/// Returns the first error encountered
pub fn profile_takes(
    takes: &[Waveform],
    config: &CompositeConfig,
) -> Result<Vec<TakeProfile>, CompositeError> {
    if config.parallel {
        takes
            .par_iter()
            .enumerate()
            .map(|(i, w)| profile_take(i, w, config))
            .collect()
    } else {
        takes
            .iter()
            .enumerate()
            .map(|(i, w)| profile_take(i, w, config))
            .collect()
    }
}

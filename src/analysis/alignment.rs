//! Cross-take alignment
//!
//! The k-th hit of every take is treated as the same logical hit. All takes are
//! truncated to the shortest hit list, then times and volumes are averaged per
//! position and times are re-expressed relative to the first position.
//!
//! Because every take's hits are strictly increasing and every take contributes
//! to every position, the averaged times are strictly increasing as well. This
//! relies on positional correspondence being meaningful; it does not check that
//! the k-th hits actually line up in time.

use super::profile::TakeProfile;
use super::result::AveragedHit;
use crate::config::VolumeAveraging;
use crate::features::volume::{db_to_power, power_to_db};

/// Number of hit positions shared by all takes
///
/// Zero if there are no takes or any take has no hits.
pub fn shared_hit_count(profiles: &[TakeProfile]) -> usize {
    profiles.iter().map(|p| p.hit_count()).min().unwrap_or(0)
}

/// Average hit times and volumes across takes
///
/// # Returns
///
/// One `AveragedHit` per shared position, with `hits[0].time == 0.0`. Empty when
/// `shared_hit_count` is zero.
pub fn align_takes(profiles: &[TakeProfile], averaging: VolumeAveraging) -> Vec<AveragedHit> {
    let count = shared_hit_count(profiles);

    if count == 0 {
        log::warn!(
            "No hit positions shared across {} takes, composite will be silent",
            profiles.len()
        );
        return Vec::new();
    }

    let takes = profiles.len() as f64;

    let raw: Vec<(f64, Option<f64>)> = (0..count)
        .map(|k| {
            let time = profiles.iter().map(|p| p.events[k].time).sum::<f64>() / takes;
            let volumes: Vec<f64> = profiles.iter().filter_map(|p| p.events[k].volume).collect();
            (time, average_volume(&volumes, averaging))
        })
        .collect();

    let origin = raw[0].0;
    let hits: Vec<AveragedHit> = raw
        .into_iter()
        .enumerate()
        .map(|(position, (time, volume))| AveragedHit {
            position,
            time: time - origin,
            volume,
        })
        .collect();

    log::debug!(
        "Aligned {} takes on {} hit positions ({:?} averaging)",
        profiles.len(),
        count,
        averaging
    );

    hits
}

/// Mean of dB volumes in the chosen domain; `None` if there are none
pub fn average_volume(volumes_db: &[f64], averaging: VolumeAveraging) -> Option<f64> {
    if volumes_db.is_empty() {
        return None;
    }

    let n = volumes_db.len() as f64;
    let mean = match averaging {
        VolumeAveraging::Decibel => volumes_db.iter().sum::<f64>() / n,
        VolumeAveraging::Power => {
            power_to_db(volumes_db.iter().map(|&db| db_to_power(db)).sum::<f64>() / n)
        }
    };

    Some(mean)
}

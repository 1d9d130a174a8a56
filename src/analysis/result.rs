//! Composite result types

use serde::{Deserialize, Serialize};

use super::metadata::CompositeMetadata;
use crate::io::Waveform;

/// Cross-take average for one hit position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AveragedHit {
    /// Hit position (index into every take's hit list)
    pub position: usize,

    /// Average onset time in seconds, relative to position 0
    pub time: f64,

    /// Average volume in dB; `None` if no take had a measurable volume here
    pub volume: Option<f64>,
}

/// The real hit chosen for one position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitSelection {
    /// Hit position being filled
    pub position: usize,

    /// Source take index (into the input list when built from files)
    pub take: usize,

    /// Index of the chosen hit within the source take
    pub onset: usize,

    /// Onset time within the source take, seconds
    pub source_time: f64,

    /// Volume of the chosen hit, dB
    pub source_volume: f64,

    /// Absolute difference from the position's average volume, dB
    pub volume_diff: f64,

    /// First composite sample the segment was written to
    pub dest_sample: usize,

    /// Samples actually copied (after truncation at the buffer end)
    pub written: usize,
}

/// Conditions worth reporting that did not stop synthesis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositeFlag {
    /// No takes were supplied
    NoUsableTakes,
    /// At least one take had no hits, so no positions are shared
    NoSharedHits,
    /// Takes had different sample rates (only under `SampleRatePolicy::LastTake`)
    MixedSampleRates,
    /// Some position had no candidate with a measurable volume
    MissingVolumes,
}

/// Complete composite result
#[derive(Debug, Clone, Serialize)]
pub struct CompositeResult {
    /// Synthesized take
    #[serde(skip)]
    pub waveform: Waveform,

    /// Averaged time and volume per shared hit position
    pub hits: Vec<AveragedHit>,

    /// Chosen source hit per position (positions without a candidate are absent)
    pub selections: Vec<HitSelection>,

    /// Run metadata
    pub metadata: CompositeMetadata,

    /// Non-fatal conditions
    pub flags: Vec<CompositeFlag>,
}

impl CompositeResult {
    /// Averaged hit times in seconds
    pub fn average_times(&self) -> Vec<f64> {
        self.hits.iter().map(|h| h.time).collect()
    }

    /// Averaged volumes in dB
    pub fn average_volumes(&self) -> Vec<Option<f64>> {
        self.hits.iter().map(|h| h.volume).collect()
    }

    /// Human-readable summary of averaged times and volumes
    ///
    /// # Example
    ///
    /// ```text
    /// Average Hit Times (seconds): [0.00, 0.95]
    /// Average Volumes for Each Hit Position: [-9.00, -5.50]
    /// ```
    pub fn report(&self) -> String {
        let times: Vec<String> = self
            .average_times()
            .iter()
            .map(|t| format!("{:.2}", t))
            .collect();
        let volumes: Vec<String> = self
            .average_volumes()
            .iter()
            .map(|v| match v {
                Some(v) => format!("{:.2}", v),
                None => "undefined".to_string(),
            })
            .collect();

        format!(
            "Average Hit Times (seconds): [{}]\nAverage Volumes for Each Hit Position: [{}]",
            times.join(", "),
            volumes.join(", ")
        )
    }
}

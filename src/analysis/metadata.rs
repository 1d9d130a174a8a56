//! Composite run metadata

use serde::{Deserialize, Serialize};

/// Composite metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeMetadata {
    /// Crate version that produced the composite
    pub algorithm_version: String,

    /// Number of takes combined
    pub take_count: usize,

    /// Hits detected per take, in take order
    pub hits_per_take: Vec<usize>,

    /// Number of hit positions shared by all takes
    pub shared_hits: usize,

    /// Composite sample rate in Hz
    pub sample_rate: u32,

    /// Composite duration in seconds
    pub duration_seconds: f64,

    /// Processing time in milliseconds
    pub processing_time_ms: f32,
}

impl Default for CompositeMetadata {
    fn default() -> Self {
        Self {
            algorithm_version: env!("CARGO_PKG_VERSION").to_string(),
            take_count: 0,
            hits_per_take: vec![],
            shared_hits: 0,
            sample_rate: 0,
            duration_seconds: 0.0,
            processing_time_ms: 0.0,
        }
    }
}

//! # Take Composite
//!
//! Builds one "best composite" take out of several recorded takes of the same
//! repeated percussive performance.
//!
//! For each hit position shared by all takes, the composite places the real
//! recorded hit whose loudness is closest to the cross-take average loudness,
//! at the cross-take average time.
//!
//! ## Quick Start
//!
//! ```no_run
//! use take_composite::{build_composite, CompositeConfig, Waveform};
//!
//! // Mono, f32, normalized takes at one sample rate
//! let takes: Vec<Waveform> = vec![];
//!
//! let result = build_composite(&takes, &CompositeConfig::default())?;
//! println!("{}", result.report());
//! # Ok::<(), take_composite::CompositeError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Take Loader → Onset Detection + Volume (per take) → Alignment → Synthesis → Take Writer
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;

use std::path::{Path, PathBuf};
use std::time::Instant;

// Re-export main types
pub use analysis::metadata::CompositeMetadata;
pub use analysis::profile::{OnsetEvent, TakeProfile};
pub use analysis::result::{AveragedHit, CompositeFlag, CompositeResult, HitSelection};
pub use config::{
    CompositeConfig, OnsetConfig, OnsetMethod, OutputFormat, SampleRatePolicy, VolumeAveraging,
};
pub use error::CompositeError;
pub use io::decoder::{LoadedTake, LoadedTakes};
pub use io::Waveform;

use analysis::alignment::{align_takes, shared_hit_count};
use analysis::profile::profile_takes;
use analysis::synthesis::synthesize;

/// Main composite function
///
/// Detects hits in every take, averages hit times and volumes across takes,
/// and assembles the composite from the closest-volume real hits.
///
/// # Arguments
///
/// * `takes` - Decoded mono takes; take order decides volume ties
/// * `config` - Composite configuration
///
/// # Returns
///
/// `CompositeResult` with the composite waveform, averaged hits, per-position
/// selections, and flags. Zero takes or zero shared hits yield a silent
/// composite of `trailing_pad` seconds rather than an error.
///
/// # Errors
///
/// - `CompositeError::InvalidInput` if the configuration is invalid
/// - `CompositeError::SampleRateMismatch` if takes differ in sample rate under
///   `SampleRatePolicy::RequireUniform`
pub fn build_composite(
    takes: &[Waveform],
    config: &CompositeConfig,
) -> Result<CompositeResult, CompositeError> {
    let start_time = Instant::now();

    config.validate()?;

    log::debug!("Starting composite: {} takes", takes.len());

    let mut flags = Vec::new();
    let sample_rate = composite_sample_rate(takes, config, &mut flags)?;

    let profiles = profile_takes(takes, config)?;
    let hits = align_takes(&profiles, config.volume_averaging);

    if !takes.is_empty() && hits.is_empty() {
        flags.push(CompositeFlag::NoSharedHits);
    }

    let (buffer, selections) = synthesize(takes, &profiles, &hits, sample_rate, config);

    if selections.len() < hits.len() {
        flags.push(CompositeFlag::MissingVolumes);
    }

    let waveform = Waveform::new(buffer, sample_rate)?;
    let processing_time_ms = start_time.elapsed().as_secs_f32() * 1000.0;

    let metadata = CompositeMetadata {
        take_count: takes.len(),
        hits_per_take: profiles.iter().map(|p| p.hit_count()).collect(),
        shared_hits: shared_hit_count(&profiles),
        sample_rate,
        duration_seconds: waveform.duration_seconds(),
        processing_time_ms,
        ..CompositeMetadata::default()
    };

    log::debug!(
        "Composite: {} positions, {} samples at {} Hz in {:.2} ms",
        hits.len(),
        waveform.len(),
        sample_rate,
        processing_time_ms
    );

    Ok(CompositeResult {
        waveform,
        hits,
        selections,
        metadata,
        flags,
    })
}

/// Build the composite from loaded files, reporting takes by input-list index
///
/// `build_composite` numbers takes by their position among the loaded ones.
/// This renumbers `HitSelection::take` and `CompositeError::SampleRateMismatch`
/// so they point into the caller's input list even when earlier inputs failed
/// to load.
///
/// # Errors
///
/// Any `build_composite` error
pub fn build_composite_loaded(
    loaded: &LoadedTakes,
    config: &CompositeConfig,
) -> Result<CompositeResult, CompositeError> {
    let to_input = |take: usize| loaded.input_index(take).unwrap_or(take);

    let mut result = build_composite(&loaded.waveforms(), config).map_err(|e| match e {
        CompositeError::SampleRateMismatch {
            expected,
            found,
            take,
        } => CompositeError::SampleRateMismatch {
            expected,
            found,
            take: to_input(take),
        },
        other => other,
    })?;

    for selection in &mut result.selections {
        selection.take = to_input(selection.take);
    }

    Ok(result)
}

/// Load takes from files, build the composite, and write it
///
/// Takes that fail to load are logged, skipped, and returned alongside the
/// result. Take indices in the result and in errors refer to `inputs`.
/// Callers that must report load failures even when the build fails should
/// call `io::decoder::load_takes` and `build_composite_loaded` separately.
///
/// # Errors
///
/// Any `build_composite` error, or `CompositeError::EncodingError` if the
/// output cannot be written
pub fn composite_files<P: AsRef<Path> + Sync>(
    inputs: &[P],
    output: &Path,
    config: &CompositeConfig,
    format: OutputFormat,
) -> Result<(CompositeResult, Vec<(PathBuf, CompositeError)>), CompositeError> {
    let loaded = io::decoder::load_takes(inputs, config.parallel);
    let result = build_composite_loaded(&loaded, config)?;
    io::encoder::write_take(output, &result.waveform, format)?;
    Ok((result, loaded.failures))
}

/// Choose the composite sample rate according to the configured policy
fn composite_sample_rate(
    takes: &[Waveform],
    config: &CompositeConfig,
    flags: &mut Vec<CompositeFlag>,
) -> Result<u32, CompositeError> {
    let (Some(first), Some(last)) = (takes.first(), takes.last()) else {
        log::warn!(
            "No usable takes, composite will be {:.2}s of silence at {} Hz",
            config.trailing_pad,
            config.fallback_sample_rate
        );
        flags.push(CompositeFlag::NoUsableTakes);
        return Ok(config.fallback_sample_rate);
    };

    let mismatch = takes
        .iter()
        .enumerate()
        .find(|(_, t)| t.sample_rate() != first.sample_rate());

    match (config.sample_rate_policy, mismatch) {
        (_, None) => Ok(first.sample_rate()),
        (SampleRatePolicy::RequireUniform, Some((take, t))) => {
            Err(CompositeError::SampleRateMismatch {
                expected: first.sample_rate(),
                found: t.sample_rate(),
                take,
            })
        }
        (SampleRatePolicy::LastTake, Some(_)) => {
            log::warn!(
                "Takes have mixed sample rates, composite uses the last take's {} Hz",
                last.sample_rate()
            );
            flags.push(CompositeFlag::MixedSampleRates);
            Ok(last.sample_rate())
        }
    }
}

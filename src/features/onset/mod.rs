//! Onset detection modules
//!
//! Two onset strength envelopes share one peak picking and backtracking stage:
//! - Spectral flux (log-power STFT, default)
//! - Energy flux (frame RMS derivative)

pub mod backtrack;
pub mod detector;
pub mod energy_flux;
pub mod peak_picking;
pub mod spectral_flux;

pub use detector::detect_hits;

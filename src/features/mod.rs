//! Feature extraction modules
//!
//! Per-take measurements feeding cross-take alignment:
//! - Onset detection (spectral or energy flux, peak picking, backtracking)
//! - Volume at a hit
//! - Hit segment extraction

pub mod onset;
pub mod segment;
pub mod volume;

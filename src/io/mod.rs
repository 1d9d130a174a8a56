//! Audio I/O modules
//!
//! Take loading with Symphonia, composite writing with hound.

pub mod decoder;
pub mod encoder;
pub mod waveform;

pub use waveform::Waveform;

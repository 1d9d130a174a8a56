//! Audio preprocessing modules
//!
//! Channel mixing (multi-channel to mono) applied to every decoded take.

pub mod channel_mixer;

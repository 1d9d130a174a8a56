//! Cross-take analysis and synthesis modules
//!
//! - Per-take onset profiles
//! - Alignment (truncation and averaging)
//! - Synthesis (closest-volume selection and placement)
//! - Result and metadata types

pub mod alignment;
pub mod metadata;
pub mod profile;
pub mod result;
pub mod synthesis;

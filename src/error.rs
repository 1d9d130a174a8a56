//! Error types for the composite pipeline

use std::fmt;

/// Errors that can occur while building a composite take
#[derive(Debug, Clone, PartialEq)]
pub enum CompositeError {
    /// Invalid input parameters or configuration
    InvalidInput(String),

    /// A take could not be opened or decoded
    DecodingError(String),

    /// The composite could not be written
    EncodingError(String),

    /// Takes disagree on sample rate while uniform rates are required
    SampleRateMismatch {
        /// Sample rate of the first take
        expected: u32,
        /// Offending sample rate
        found: u32,
        /// Index of the offending take in the caller's input list
        take: usize,
    },
}

impl fmt::Display for CompositeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositeError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            CompositeError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
            CompositeError::EncodingError(msg) => write!(f, "Encoding error: {}", msg),
            CompositeError::SampleRateMismatch {
                expected,
                found,
                take,
            } => write!(
                f,
                "Sample rate mismatch: take {} is {} Hz, expected {} Hz",
                take, found, expected
            ),
        }
    }
}

impl std::error::Error for CompositeError {}

impl From<hound::Error> for CompositeError {
    fn from(err: hound::Error) -> Self {
        CompositeError::EncodingError(err.to_string())
    }
}

impl From<symphonia::core::errors::Error> for CompositeError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        CompositeError::DecodingError(err.to_string())
    }
}

//! Error type shared by every stage of the pipeline.

/// Failures reported by the conversion, voting and peak stages.
///
/// Out-of-bounds window cells are not represented here: the peak detector
/// skips them silently as part of its boundary policy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HoughError {
    /// Every pixel has zero color magnitude, so brightness normalization
    /// would divide by zero.
    #[error("image has zero color magnitude everywhere, cannot normalize brightness")]
    DegenerateImage,

    /// A raw buffer does not hold the number of samples its dimensions imply.
    #[error("buffer holds {actual} samples, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    /// A window center lies outside the matrix.
    #[error("offset {offset} is outside a matrix of {len} samples")]
    OffsetOutOfBounds { offset: usize, len: usize },

    #[error("kernel size must be at least 1")]
    InvalidKernelSize,

    #[error("accumulator needs at least one angle bin")]
    InvalidAngleBins,

    /// The requested operation is not provided by this crate.
    #[error("{0} is not supported")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, HoughError>;

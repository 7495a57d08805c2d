//! Error types for phase map computation.

use thiserror::Error;

/// Fatal errors. Any of these aborts the run before output is produced.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Movie has no samples (shape {frames}x{height}x{width})")]
    EmptyMovie {
        frames: usize,
        height: usize,
        width: usize,
    },

    #[error("Shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to allocate {bytes} bytes for {what}")]
    Allocation { what: &'static str, bytes: usize },
}

impl Error {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Numerical failure confined to one pixel. The pixel is sentinel-filled and counted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PixelError {
    #[error("Non-finite input sample at t={sample}")]
    NonFiniteInput { sample: usize },

    #[error("Non-finite wavelet coefficient at period index {period_index}")]
    NonFiniteCoefficients { period_index: usize },
}

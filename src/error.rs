//! Error types for the median filtering entry points.
//!
//! All argument validation happens before any pixel is touched, so an
//! `Err` always means the input array was returned untouched.

use thiserror::Error;

/// Errors raised while validating filter arguments.
#[derive(Debug, Error)]
pub enum MedianFilterError {
    /// Kernel size is even or smaller than 3.
    #[error("kernel size must be an odd integer >= 3, got {0}")]
    InvalidKernel(usize),

    /// Input array is neither a 2D channel nor a 3D (H, W, C) image.
    #[error("expected a 2D grayscale or 3D color image array, got {0} dimensions")]
    InvalidRank(usize),

    /// Backend name not in {"auto", "heap", "vectorized"}.
    #[error("backend must be one of 'auto', 'heap' or 'vectorized', got '{0}'")]
    UnknownBackend(String),

    /// Padding mode name not supported.
    #[error("pad mode must be one of 'reflect' or 'edge', got '{0}'")]
    UnknownPadMode(String),

    /// Parameter outside its documented range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for filter operations.
pub type MedianFilterResult<T> = Result<T, MedianFilterError>;

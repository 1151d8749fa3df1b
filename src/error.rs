//! Error types for gebp operations.
//!
//! The packers and micro-kernels treat malformed arguments as caller bugs and
//! only assert on them. The safe entry points ([`crate::gemm()`] and the operand
//! views) validate their inputs up front and report problems through
//! [`GebpError`] before any coefficient is written.

use std::fmt;

/// Errors that can occur while setting up a matrix product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GebpError {
    /// Operand shapes do not compose into `dst += lhs * rhs`.
    DimensionMismatch {
        /// Shape of the left operand.
        lhs: (usize, usize),
        /// Shape of the right operand.
        rhs: (usize, usize),
        /// Shape of the destination.
        dst: (usize, usize),
    },
    /// A view addresses coefficients past the end of its backing slice.
    BufferTooSmall {
        /// Number of scalars the view needs.
        required: usize,
        /// Number of scalars the slice holds.
        actual: usize,
        /// Human-readable error message.
        message: String,
    },
    /// A mutable view whose strides make two coefficients share storage.
    OverlappingView {
        /// Human-readable error message.
        message: String,
    },
    /// Cache blocking parameters that cannot drive the blocked loops.
    InvalidBlocking {
        /// Human-readable error message.
        message: String,
    },
}

impl fmt::Display for GebpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GebpError::DimensionMismatch { lhs, rhs, dst } => write!(
                f,
                "Dimension mismatch: cannot accumulate {}x{} * {}x{} into {}x{}",
                lhs.0, lhs.1, rhs.0, rhs.1, dst.0, dst.1
            ),
            GebpError::BufferTooSmall {
                required,
                actual,
                message,
            } => write!(
                f,
                "Buffer too small: {} (requires {} elements, got {})",
                message, required, actual
            ),
            GebpError::OverlappingView { message } => {
                write!(f, "Overlapping view: {}", message)
            }
            GebpError::InvalidBlocking { message } => {
                write!(f, "Invalid blocking: {}", message)
            }
        }
    }
}

impl std::error::Error for GebpError {}

/// Result type alias for gebp operations.
pub type Result<T> = std::result::Result<T, GebpError>;

/// Creates a dimension mismatch error.
pub fn dimension_error(lhs: (usize, usize), rhs: (usize, usize), dst: (usize, usize)) -> GebpError {
    GebpError::DimensionMismatch { lhs, rhs, dst }
}

/// Creates a buffer size error.
pub fn buffer_error(required: usize, actual: usize, message: impl Into<String>) -> GebpError {
    GebpError::BufferTooSmall {
        required,
        actual,
        message: message.into(),
    }
}

/// Creates an overlapping view error.
pub fn overlap_error(message: impl Into<String>) -> GebpError {
    GebpError::OverlappingView {
        message: message.into(),
    }
}

/// Creates a blocking parameter error.
pub fn blocking_error(message: impl Into<String>) -> GebpError {
    GebpError::InvalidBlocking {
        message: message.into(),
    }
}

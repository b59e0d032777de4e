//! Error types for sparse storage
//!
//! Point access on vectors and matrices is unchecked by contract; the errors
//! here cover construction requests and the explicit bounds checks offered to
//! callers that cannot guarantee their indices.
//!
//! # Examples
//!
//! ```
//! use latrec_sparse::error::SparseError;
//! use latrec_sparse::factory::ValueDomain;
//!
//! let err = "complex".parse::<ValueDomain>().unwrap_err();
//! assert!(matches!(err, SparseError::UnsupportedDomain(_)));
//! ```

use thiserror::Error;

/// Top-level error type for sparse storage operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SparseError {
    /// Requested value domain has no storage implementation
    #[error("Unsupported value domain: {0:?} (expected one of boolean, byte, short, char, int, long, float, double)")]
    UnsupportedDomain(String),

    /// Cell coordinates outside the matrix shape
    #[error("Index out of bounds: ({row}, {col}) for {rows}×{cols} matrix")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Dense operand length does not match the matrix
    #[error("Shape mismatch: matrix is {rows}×{cols}, vector has length {len}")]
    VectorLength { rows: usize, cols: usize, len: usize },

    /// Symmetric storage requested for a non-square shape
    #[error("Symmetric storage requires a square shape, got {rows}×{cols}")]
    NotSquare { rows: usize, cols: usize },
}

/// Result type alias for sparse storage operations
pub type SparseResult<T> = Result<T, SparseError>;

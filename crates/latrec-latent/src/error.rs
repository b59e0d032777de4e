//! Error types for latent factor models and their decompositions

use thiserror::Error;

/// Errors raised while building networks, models and decompositions
///
/// Every variant is reported at construction time. Running a decomposition
/// never fails: running out of iterations is reported through
/// [`ConvergenceInfo`](crate::ConvergenceInfo) instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LatentError {
    #[error("Invalid rank {rank}: must be between 1 and {max}")]
    InvalidRank { rank: usize, max: usize },

    #[error("Invalid tolerance: {0}")]
    InvalidTolerance(f64),

    #[error("Invalid iteration budget: {0}")]
    InvalidBudget(usize),

    #[error("Invalid relation weight: {0}")]
    InvalidWeight(f64),

    #[error("Unknown entity type: {0}")]
    UnknownEntityType(usize),

    #[error("Unknown relation: {0}")]
    UnknownRelation(usize),

    #[error(
        "Relation between types {source_type} and {target_type} expects a {expected_rows}x{expected_cols} matrix, got {rows}x{cols}"
    )]
    RelationShape {
        source_type: usize,
        target_type: usize,
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Network has no entity types")]
    EmptyNetwork,
}

/// Result type for latent model operations
pub type LatentResult<T> = Result<T, LatentError>;

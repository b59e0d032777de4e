//! # latrec-sparse
//!
//! Sparse vectors and matrices for the latrec numeric substrate.
//!
//! This crate provides:
//! - [`SparseVector`]: sorted `(index, value)` sequences with binary-search
//!   point access and a mutating traversal cursor
//! - [`SparseMatrix`]: row and column views kept consistent behind a single
//!   setter, with dense multiplication (`mult`, `mult_t`) and optional
//!   symmetric storage
//! - [`MatrixFactory`]: selection of the narrowest index width and the
//!   requested value width for a shape
//!
//! Consumers program against the object-safe [`Matrix`] and [`Vector`]
//! traits, which speak `usize` and `f64`; the stored widths appear only as
//! the `index_type()` / `weight_type()` descriptors.
//!
//! ## Quick Start
//!
//! ```
//! use latrec_sparse::{MatrixFactory, ValueDomain};
//!
//! let mut m = MatrixFactory::new_matrix(3, 2, ValueDomain::Double);
//! m.set(0, 0, 1.0);
//! m.set(2, 1, -2.0);
//!
//! let y = m.mult(&[1.0, 1.0], None, 1.0);
//! assert_eq!(y, vec![1.0, 0.0, -2.0]);
//! assert_eq!(m.col(1).get(2), -2.0);
//! ```

#![deny(warnings)]

pub mod error;
pub mod factory;
pub mod index;
pub mod matrix;
pub mod vector;
pub mod weight;

// Re-exports
pub use error::*;
pub use factory::{MatrixFactory, ValueDomain};
pub use index::{IndexWidth, SparseIndex};
pub use matrix::{check_bounds, check_operand, Matrix, MatrixCursor, SparseMatrix};
pub use vector::{SparseVector, Vector, VectorCursor};
pub use weight::{Presence, ValueStore, Weight};

//! Row/column synchronized sparse matrices
//!
//! A [`SparseMatrix`] keeps one [`SparseVector`] per row and one per column.
//! Both views are owned by the matrix and only ever written together through
//! [`Matrix::set`], [`Matrix::add`] or the [`MatrixCursor`], so a read through
//! the row view and a read through the column view always agree.
//!
//! Square matrices can instead be created with symmetric storage: only the
//! row views exist, `col(j)` is `row(j)`, and every write lands on both
//! `(i, j)` and `(j, i)`.
//!
//! # Bounds
//!
//! Point access is unchecked. Indices outside `[0, rows) × [0, cols)` either
//! panic in slice indexing or address a wrong cell; callers that cannot
//! guarantee their indices validate them with [`check_bounds`] first.
//!
//! # Examples
//!
//! ```
//! use latrec_sparse::matrix::{Matrix, SparseMatrix};
//!
//! // [1.0  0  ]
//! // [0    2.0]
//! // [3.0  4.0]
//! let mut m = SparseMatrix::<u8, f64>::new(3, 2);
//! m.set(0, 0, 1.0);
//! m.set(1, 1, 2.0);
//! m.set(2, 0, 3.0);
//! m.set(2, 1, 4.0);
//!
//! let out = m.mult(&[1.0, 1.0], None, 2.0);
//! assert_eq!(out, vec![2.0, 4.0, 14.0]);
//! assert_eq!(m.nnz(), 4);
//! ```

use crate::error::{SparseError, SparseResult};
use crate::index::SparseIndex;
use crate::vector::{SparseVector, Vector};
use crate::weight::Weight;
use scirs2_core::ndarray_ext::Array2;
use std::fmt;

/// Object-safe view of a sparse matrix, expressed in `usize` and `f64`
pub trait Matrix: fmt::Debug + Send + Sync {
    fn rows(&self) -> usize;

    fn cols(&self) -> usize;

    /// Number of occupied cells, computed by a scan over the row views
    fn nnz(&self) -> usize;

    /// Value at `(i, j)`, zero for empty cells
    fn get(&self, i: usize, j: usize) -> f64;

    /// Overwrite the value at `(i, j)` in both views
    fn set(&mut self, i: usize, j: usize, value: f64);

    /// Accumulate into the value at `(i, j)` in both views
    fn add(&mut self, i: usize, j: usize, value: f64);

    /// Row `i` as a sparse vector indexed by column
    fn row(&self, i: usize) -> &dyn Vector;

    /// Column `j` as a sparse vector indexed by row
    fn col(&self, j: usize) -> &dyn Vector;

    /// All row vectors in row order
    fn get_rows(&self) -> Box<dyn Iterator<Item = &dyn Vector> + '_>;

    /// All column vectors in column order
    fn get_cols(&self) -> Box<dyn Iterator<Item = &dyn Vector> + '_>;

    /// `out[i] += weight * Σ_j self[i, j] * v[j]`, allocating a zero `out` of
    /// length `rows()` when none is given
    fn mult(&self, v: &[f64], out: Option<Vec<f64>>, weight: f64) -> Vec<f64>;

    /// `out[j] += weight * Σ_i self[i, j] * v[i]`, allocating a zero `out` of
    /// length `cols()` when none is given
    fn mult_t(&self, v: &[f64], out: Option<Vec<f64>>, weight: f64) -> Vec<f64>;

    /// Occupied cells as `(row, col, value)` in row-major order
    fn entries(&self) -> Box<dyn Iterator<Item = (usize, usize, f64)> + '_>;

    /// The cell at storage position `pos` of row `i`
    fn row_entry(&self, i: usize, pos: usize) -> Option<(usize, f64)>;

    /// Replace the value of the cell at storage position `pos` of row `i`,
    /// keeping the column view in step
    fn set_row_entry(&mut self, i: usize, pos: usize, value: f64);

    /// Traversal cursor over every occupied cell with in-place replacement
    fn all(&mut self) -> MatrixCursor<'_>;

    /// `true` only when the storage guarantees `self[i, j] == self[j, i]`
    fn is_symmetric(&self) -> bool;

    fn weight_type(&self) -> &'static str;

    fn index_type(&self) -> &'static str;

    /// Deep copy with the same shape, storage and widths
    fn clone_boxed(&self) -> Box<dyn Matrix>;

    /// Fraction of occupied cells
    fn density(&self) -> f64 {
        let total = self.rows() * self.cols();
        if total == 0 {
            return 0.0;
        }
        self.nnz() as f64 / total as f64
    }

    /// Dense copy, for tests and small consumers
    fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::<f64>::zeros((self.rows(), self.cols()));
        for (i, j, value) in self.entries() {
            dense[[i, j]] = value;
        }
        dense
    }
}

/// Validate `(i, j)` against the shape of `m`
pub fn check_bounds(m: &dyn Matrix, i: usize, j: usize) -> SparseResult<()> {
    if i >= m.rows() || j >= m.cols() {
        return Err(SparseError::OutOfBounds {
            row: i,
            col: j,
            rows: m.rows(),
            cols: m.cols(),
        });
    }
    Ok(())
}

/// Validate a dense operand length for `mult` (`transposed == false`) or `mult_t`
pub fn check_operand(m: &dyn Matrix, len: usize, transposed: bool) -> SparseResult<()> {
    let expected = if transposed { m.rows() } else { m.cols() };
    if len != expected {
        return Err(SparseError::VectorLength {
            rows: m.rows(),
            cols: m.cols(),
            len,
        });
    }
    Ok(())
}

/// Sparse matrix over index width `I` and value width `W`
pub struct SparseMatrix<I, W: Weight> {
    nrows: usize,
    ncols: usize,
    row_vectors: Vec<SparseVector<I, W>>,
    /// `None` for symmetric storage, where column `j` is row `j`
    col_vectors: Option<Vec<SparseVector<I, W>>>,
}

impl<I: SparseIndex, W: Weight> Clone for SparseMatrix<I, W> {
    fn clone(&self) -> Self {
        Self {
            nrows: self.nrows,
            ncols: self.ncols,
            row_vectors: self.row_vectors.clone(),
            col_vectors: self.col_vectors.clone(),
        }
    }
}

impl<I: SparseIndex, W: Weight> fmt::Debug for SparseMatrix<I, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseMatrix")
            .field("rows", &self.nrows)
            .field("cols", &self.ncols)
            .field("symmetric", &self.col_vectors.is_none())
            .field("index_type", &I::NAME)
            .field("weight_type", &W::NAME)
            .finish()
    }
}

impl<I: SparseIndex, W: Weight> SparseMatrix<I, W> {
    /// Create an empty `rows × cols` matrix
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            nrows: rows,
            ncols: cols,
            row_vectors: (0..rows).map(|_| SparseVector::new()).collect(),
            col_vectors: Some((0..cols).map(|_| SparseVector::new()).collect()),
        }
    }

    /// Create an empty `n × n` matrix with symmetric storage
    pub fn symmetric(n: usize) -> Self {
        Self {
            nrows: n,
            ncols: n,
            row_vectors: (0..n).map(|_| SparseVector::new()).collect(),
            col_vectors: None,
        }
    }

    /// Typed row view
    pub fn row_vector(&self, i: usize) -> &SparseVector<I, W> {
        &self.row_vectors[i]
    }

    /// Typed column view
    pub fn col_vector(&self, j: usize) -> &SparseVector<I, W> {
        match &self.col_vectors {
            Some(cols) => &cols[j],
            None => &self.row_vectors[j],
        }
    }

    /// Stored weight at `(i, j)`, read from the shorter of the two views
    pub fn get_weight(&self, i: usize, j: usize) -> Option<W> {
        match &self.col_vectors {
            Some(cols) if cols[j].len() < self.row_vectors[i].len() => cols[j].get_weight(i),
            _ => self.row_vectors[i].get_weight(j),
        }
    }

    pub fn set_weight(&mut self, i: usize, j: usize, weight: W) {
        self.row_vectors[i].set_weight(j, weight);
        match &mut self.col_vectors {
            Some(cols) => cols[j].set_weight(i, weight),
            None if i != j => self.row_vectors[j].set_weight(i, weight),
            None => {}
        }
    }

    pub fn add_weight(&mut self, i: usize, j: usize, weight: W) {
        self.row_vectors[i].add_weight(j, weight);
        match &mut self.col_vectors {
            Some(cols) => cols[j].add_weight(i, weight),
            None if i != j => self.row_vectors[j].add_weight(i, weight),
            None => {}
        }
    }
}

impl<I: SparseIndex, W: Weight> Matrix for SparseMatrix<I, W> {
    fn rows(&self) -> usize {
        self.nrows
    }

    fn cols(&self) -> usize {
        self.ncols
    }

    fn nnz(&self) -> usize {
        self.row_vectors.iter().map(SparseVector::len).sum()
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.get_weight(i, j).map_or(0.0, Weight::to_f64)
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        debug_assert!(value.is_finite(), "non-finite value {} at ({}, {})", value, i, j);
        self.set_weight(i, j, W::from_f64(value));
    }

    fn add(&mut self, i: usize, j: usize, value: f64) {
        debug_assert!(value.is_finite(), "non-finite value {} at ({}, {})", value, i, j);
        self.add_weight(i, j, W::from_f64(value));
    }

    fn row(&self, i: usize) -> &dyn Vector {
        self.row_vector(i)
    }

    fn col(&self, j: usize) -> &dyn Vector {
        self.col_vector(j)
    }

    fn get_rows(&self) -> Box<dyn Iterator<Item = &dyn Vector> + '_> {
        Box::new(self.row_vectors.iter().map(|v| v as &dyn Vector))
    }

    fn get_cols(&self) -> Box<dyn Iterator<Item = &dyn Vector> + '_> {
        Box::new((0..self.ncols).map(move |j| self.col_vector(j) as &dyn Vector))
    }

    fn mult(&self, v: &[f64], out: Option<Vec<f64>>, weight: f64) -> Vec<f64> {
        let mut out = out.unwrap_or_else(|| vec![0.0; self.nrows]);
        for (i, row) in self.row_vectors.iter().enumerate() {
            out[i] += weight * row.scalar_product(v);
        }
        out
    }

    fn mult_t(&self, v: &[f64], out: Option<Vec<f64>>, weight: f64) -> Vec<f64> {
        let mut out = out.unwrap_or_else(|| vec![0.0; self.ncols]);
        for j in 0..self.ncols {
            out[j] += weight * self.col_vector(j).scalar_product(v);
        }
        out
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (usize, usize, f64)> + '_> {
        Box::new(
            self.row_vectors
                .iter()
                .enumerate()
                .flat_map(|(i, row)| row.iter_weights().map(move |(j, w)| (i, j, w.to_f64()))),
        )
    }

    fn row_entry(&self, i: usize, pos: usize) -> Option<(usize, f64)> {
        self.row_vectors[i].entry(pos)
    }

    fn set_row_entry(&mut self, i: usize, pos: usize, value: f64) {
        debug_assert!(value.is_finite(), "non-finite value {} in row {}", value, i);
        let weight = W::from_f64(value);
        let Some((j, _)) = self.row_vectors[i].weight_at(pos) else {
            return;
        };
        self.row_vectors[i].replace_at(pos, weight);
        match &mut self.col_vectors {
            Some(cols) => {
                if let Ok(col_pos) = cols[j].position(i) {
                    cols[j].replace_at(col_pos, weight);
                }
            }
            None if i != j => {
                if let Ok(mirror_pos) = self.row_vectors[j].position(i) {
                    self.row_vectors[j].replace_at(mirror_pos, weight);
                }
            }
            None => {}
        }
    }

    fn all(&mut self) -> MatrixCursor<'_> {
        MatrixCursor::new(self)
    }

    fn is_symmetric(&self) -> bool {
        self.col_vectors.is_none()
    }

    fn weight_type(&self) -> &'static str {
        W::NAME
    }

    fn index_type(&self) -> &'static str {
        I::NAME
    }

    fn clone_boxed(&self) -> Box<dyn Matrix> {
        Box::new(self.clone())
    }
}

/// Traversal cursor over the occupied cells of a matrix, row by row
///
/// Holds a `(row, position)` pair into the owning matrix. [`MatrixCursor::set`]
/// rewrites the current cell in both views and is the only mutation allowed
/// during a traversal. On symmetric storage only the upper triangle
/// (`col >= row`) is visited; setting it rewrites the mirrored cell too, so
/// every stored value is rewritten exactly once per pass.
pub struct MatrixCursor<'a> {
    matrix: &'a mut dyn Matrix,
    row: usize,
    next: usize,
    current: Option<(usize, usize)>,
}

impl<'a> MatrixCursor<'a> {
    pub fn new(matrix: &'a mut dyn Matrix) -> Self {
        Self {
            matrix,
            row: 0,
            next: 0,
            current: None,
        }
    }

    /// Advance to the next occupied cell, returning `(row, col, value)`
    pub fn next_entry(&mut self) -> Option<(usize, usize, f64)> {
        let upper_only = self.matrix.is_symmetric();
        while self.row < self.matrix.rows() {
            while let Some((j, value)) = self.matrix.row_entry(self.row, self.next) {
                let pos = self.next;
                self.next += 1;
                if upper_only && j < self.row {
                    continue;
                }
                self.current = Some((self.row, pos));
                return Some((self.row, j, value));
            }
            self.row += 1;
            self.next = 0;
        }
        self.current = None;
        None
    }

    /// Replace the value of the cell last returned by [`Self::next_entry`]
    ///
    /// The cell is never removed. On unweighted storage every active cell
    /// is `true`, so `set(0.0)` leaves it unchanged.
    pub fn set(&mut self, value: f64) {
        debug_assert!(self.current.is_some(), "cursor set() outside a cell");
        if let Some((i, pos)) = self.current {
            self.matrix.set_row_entry(i, pos, value);
        }
    }

    /// Restart from the first cell
    pub fn reset(&mut self) {
        self.row = 0;
        self.next = 0;
        self.current = None;
    }
}

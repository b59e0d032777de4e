//! Sorted sparse vectors
//!
//! A [`SparseVector`] is an ordered sequence of `(index, value)` pairs with
//! strictly increasing indices. It has no fixed length: its size is the
//! number of active cells, and every index that was never set reads as zero.
//!
//! # Format
//!
//! - `indices`: `Vec<I>` of active positions, sorted and unique
//! - `values`: the weight's store, holding one value per active position
//!   (nothing at all for unweighted vectors)
//!
//! Point access is a binary search. Inserting a new position shifts the
//! tail, and the backing storage grows by a constant factor so repeated
//! insertions allocate amortized O(1) times.
//!
//! # Examples
//!
//! ```
//! use latrec_sparse::vector::{SparseVector, Vector};
//!
//! let mut v = SparseVector::<u8, f32>::new();
//! v.set(7, 2.0);
//! v.set(3, 1.0);
//! v.add(7, 0.5);
//!
//! assert_eq!(v.get(7), 2.5);
//! assert_eq!(v.get(4), 0.0);
//! assert_eq!(v.iter().collect::<Vec<_>>(), vec![(3, 1.0), (7, 2.5)]);
//! assert_eq!(v.index_type(), "byte");
//! assert_eq!(v.weight_type(), "float");
//! ```

use crate::index::SparseIndex;
use crate::weight::{ValueStore, Weight};
use std::fmt;

/// Growth factor applied to the backing storage when it is full
pub const GROWTH_FACTOR: f64 = 1.5;

/// Smallest number of slots reserved by a growing vector
pub const MIN_RESERVE: usize = 4;

/// Object-safe view of a sparse vector, expressed in `usize` and `f64`
///
/// This is the interface external consumers program against; the concrete
/// index and value widths are visible only through [`Vector::index_type`]
/// and [`Vector::weight_type`].
pub trait Vector: fmt::Debug + Send + Sync {
    /// Number of active cells
    fn nnz(&self) -> usize;

    /// Value at `index`, zero when absent
    fn get(&self, index: usize) -> f64;

    /// Overwrite the value at `index`, inserting the cell if absent
    fn set(&mut self, index: usize, value: f64);

    /// Accumulate into the value at `index`, inserting the cell if absent
    fn add(&mut self, index: usize, value: f64);

    /// Active cells in increasing index order
    fn iter(&self) -> Box<dyn Iterator<Item = (usize, f64)> + '_>;

    /// The cell at storage position `pos`, counting active cells from zero
    fn entry(&self, pos: usize) -> Option<(usize, f64)>;

    /// Replace the value of the cell at storage position `pos`
    fn set_entry(&mut self, pos: usize, value: f64);

    /// Traversal cursor supporting in-place value replacement
    fn cursor(&mut self) -> VectorCursor<'_>;

    /// Σ `value[k] * dense[index[k]]` over the active cells
    fn scalar_product(&self, dense: &[f64]) -> f64;

    fn weight_type(&self) -> &'static str;

    fn index_type(&self) -> &'static str;

    /// Deep copy with the same index and value widths
    fn clone_boxed(&self) -> Box<dyn Vector>;
}

/// Sparse vector over index width `I` and value width `W`
pub struct SparseVector<I, W: Weight> {
    indices: Vec<I>,
    values: W::Store,
}

impl<I: Clone, W: Weight> Clone for SparseVector<I, W> {
    fn clone(&self) -> Self {
        Self {
            indices: self.indices.clone(),
            values: self.values.clone(),
        }
    }
}

impl<I: SparseIndex, W: Weight> fmt::Debug for SparseVector<I, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseVector")
            .field("index_type", &I::NAME)
            .field("weight_type", &W::NAME)
            .field("entries", &self.iter_weights().collect::<Vec<_>>())
            .finish()
    }
}

impl<I, W: Weight> Default for SparseVector<I, W> {
    fn default() -> Self {
        Self {
            indices: Vec::new(),
            values: W::Store::default(),
        }
    }
}

impl<I: SparseIndex, W: Weight> SparseVector<I, W> {
    /// Create an empty vector
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty vector with room for `capacity` cells
    pub fn with_capacity(capacity: usize) -> Self {
        let mut v = Self::default();
        v.indices.reserve_exact(capacity);
        v.values.reserve_exact(capacity);
        v
    }

    /// Number of active cells
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Largest active index
    pub fn max_index(&self) -> Option<usize> {
        self.indices.last().map(|i| i.to_usize())
    }

    /// Binary search for `index`: `Ok(pos)` if active, `Err(insert_pos)` otherwise
    #[inline]
    pub fn position(&self, index: usize) -> Result<usize, usize> {
        self.indices.binary_search(&I::from_usize(index))
    }

    /// Stored weight at `index`
    pub fn get_weight(&self, index: usize) -> Option<W> {
        self.position(index).ok().map(|pos| self.values.value(pos))
    }

    /// Overwrite the weight at `index`
    ///
    /// On stores that cannot hold zeros, setting a zero removes the cell.
    pub fn set_weight(&mut self, index: usize, weight: W) {
        let drops_zero = !W::Store::KEEPS_ZEROS && weight.is_zero();
        match self.position(index) {
            Ok(pos) if drops_zero => self.remove_at(pos),
            Ok(pos) => self.values.replace(pos, weight),
            Err(_) if drops_zero => {}
            Err(pos) => self.insert_at(pos, index, weight),
        }
    }

    /// Accumulate `weight` into the cell at `index`
    pub fn add_weight(&mut self, index: usize, weight: W) {
        match self.position(index) {
            Ok(pos) => {
                let sum = self.values.value(pos).accumulate(weight);
                if !W::Store::KEEPS_ZEROS && sum.is_zero() {
                    self.remove_at(pos);
                } else {
                    self.values.replace(pos, sum);
                }
            }
            Err(pos) => {
                if W::Store::KEEPS_ZEROS || !weight.is_zero() {
                    self.insert_at(pos, index, weight);
                }
            }
        }
    }

    /// Remove the cell at `index`; returns whether it was active
    pub fn remove(&mut self, index: usize) -> bool {
        match self.position(index) {
            Ok(pos) => {
                self.remove_at(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Drop every cell, keeping the allocation
    pub fn clear(&mut self) {
        self.indices.clear();
        self.values.clear();
    }

    /// Weight of the cell at storage position `pos`
    #[inline]
    pub fn weight_at(&self, pos: usize) -> Option<(usize, W)> {
        self.indices
            .get(pos)
            .map(|i| (i.to_usize(), self.values.value(pos)))
    }

    /// Replace the weight of the cell at storage position `pos`
    ///
    /// The cell stays active even when `weight` is zero; structural changes
    /// are never made through a position. On unweighted storage the cell
    /// keeps reading `true`, so replacing it with zero is a no-op.
    #[inline]
    pub fn replace_at(&mut self, pos: usize, weight: W) {
        self.values.replace(pos, weight);
    }

    /// Active cells as `(index, weight)` in increasing index order
    pub fn iter_weights(&self) -> Weights<'_, I, W> {
        Weights {
            vector: self,
            pos: 0,
        }
    }

    fn insert_at(&mut self, pos: usize, index: usize, weight: W) {
        self.grow();
        self.indices.insert(pos, I::from_usize(index));
        self.values.insert(pos, weight);
    }

    fn remove_at(&mut self, pos: usize) {
        self.indices.remove(pos);
        self.values.remove(pos);
    }

    /// Reserve `GROWTH_FACTOR` times the current size once the storage is full
    fn grow(&mut self) {
        let len = self.indices.len();
        if len < self.indices.capacity() {
            return;
        }
        let additional = ((len as f64 * (GROWTH_FACTOR - 1.0)).ceil() as usize).max(MIN_RESERVE);
        self.indices.reserve_exact(additional);
        self.values.reserve_exact(additional);
    }
}

impl<I: SparseIndex, W: Weight> Vector for SparseVector<I, W> {
    fn nnz(&self) -> usize {
        self.len()
    }

    fn get(&self, index: usize) -> f64 {
        self.get_weight(index).map_or(0.0, Weight::to_f64)
    }

    fn set(&mut self, index: usize, value: f64) {
        debug_assert!(value.is_finite(), "non-finite value {} at {}", value, index);
        self.set_weight(index, W::from_f64(value));
    }

    fn add(&mut self, index: usize, value: f64) {
        debug_assert!(value.is_finite(), "non-finite value {} at {}", value, index);
        self.add_weight(index, W::from_f64(value));
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (usize, f64)> + '_> {
        Box::new(self.iter_weights().map(|(i, w)| (i, w.to_f64())))
    }

    fn entry(&self, pos: usize) -> Option<(usize, f64)> {
        self.weight_at(pos).map(|(i, w)| (i, w.to_f64()))
    }

    fn set_entry(&mut self, pos: usize, value: f64) {
        debug_assert!(value.is_finite(), "non-finite value {} at position {}", value, pos);
        self.replace_at(pos, W::from_f64(value));
    }

    fn cursor(&mut self) -> VectorCursor<'_> {
        VectorCursor::new(self)
    }

    fn scalar_product(&self, dense: &[f64]) -> f64 {
        self.iter_weights()
            .map(|(i, w)| w.to_f64() * dense[i])
            .sum()
    }

    fn weight_type(&self) -> &'static str {
        W::NAME
    }

    fn index_type(&self) -> &'static str {
        I::NAME
    }

    fn clone_boxed(&self) -> Box<dyn Vector> {
        Box::new(self.clone())
    }
}

/// Iterator over the active cells of a [`SparseVector`]
pub struct Weights<'a, I, W: Weight> {
    vector: &'a SparseVector<I, W>,
    pos: usize,
}

impl<'a, I: SparseIndex, W: Weight> Iterator for Weights<'a, I, W> {
    type Item = (usize, W);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.vector.weight_at(self.pos)?;
        self.pos += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vector.len() - self.pos;
        (remaining, Some(remaining))
    }
}

impl<'a, I: SparseIndex, W: Weight> ExactSizeIterator for Weights<'a, I, W> {}

/// Traversal cursor over a vector that allows replacing the current value
///
/// The cursor holds a storage position, not a reference to the cell, so the
/// only mutation it permits is [`VectorCursor::set`]. Inserting or removing
/// cells while a cursor is alive is impossible through the borrow it holds.
pub struct VectorCursor<'a> {
    vector: &'a mut dyn Vector,
    next: usize,
    current: Option<usize>,
}

impl<'a> VectorCursor<'a> {
    pub fn new(vector: &'a mut dyn Vector) -> Self {
        Self {
            vector,
            next: 0,
            current: None,
        }
    }

    /// Advance to the next active cell
    pub fn next_entry(&mut self) -> Option<(usize, f64)> {
        let entry = self.vector.entry(self.next)?;
        self.current = Some(self.next);
        self.next += 1;
        Some(entry)
    }

    /// Replace the value of the cell last returned by [`Self::next_entry`]
    ///
    /// The cell is never removed. On unweighted storage every active cell
    /// is `true`, so `set(0.0)` leaves it unchanged.
    pub fn set(&mut self, value: f64) {
        debug_assert!(self.current.is_some(), "cursor set() before next_entry()");
        if let Some(pos) = self.current {
            self.vector.set_entry(pos, value);
        }
    }

    /// Restart from the first cell
    pub fn reset(&mut self) {
        self.next = 0;
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_overwrite() {
        let mut v = SparseVector::<u32, f64>::new();
        v.set(10, 1.0);
        v.set(2, 3.0);
        v.set(10, -4.0);
        assert_eq!(v.get(10), -4.0);
        assert_eq!(v.get(2), 3.0);
        assert_eq!(v.get(3), 0.0);
        assert_eq!(v.nnz(), 2);
    }

    #[test]
    fn test_indices_stay_sorted() {
        let mut v = SparseVector::<u16, i32>::new();
        for i in [9, 1, 5, 3, 7, 1] {
            v.set(i, i as f64);
        }
        let indices: Vec<usize> = v.iter().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![1, 3, 5, 7, 9]);
        assert_eq!(v.max_index(), Some(9));
    }

    #[test]
    fn test_add_accumulates() {
        let mut v = SparseVector::<u8, i16>::new();
        v.add(4, 2.0);
        v.add(4, 3.0);
        v.add(1, -1.0);
        assert_eq!(v.get(4), 5.0);
        assert_eq!(v.get(1), -1.0);
    }

    #[test]
    fn test_unweighted_vector() {
        let mut v = SparseVector::<u8, bool>::new();
        v.set(3, 1.0);
        v.set(6, 0.25);
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.get(6), 1.0);

        v.set(3, 0.0);
        assert_eq!(v.nnz(), 1);
        assert_eq!(v.get(3), 0.0);
        assert_eq!(v.weight_type(), "boolean");
    }

    #[test]
    fn test_growth_is_multiplicative() {
        let mut v = SparseVector::<u32, f64>::new();
        let mut reallocations = 0;
        let mut capacity = v.indices.capacity();
        for i in 0..1000 {
            v.set(i, 1.0);
            if v.indices.capacity() != capacity {
                reallocations += 1;
                capacity = v.indices.capacity();
            }
        }
        assert_eq!(v.nnz(), 1000);
        assert!(reallocations < 20, "{} reallocations", reallocations);
    }

    #[test]
    fn test_scalar_product() {
        let mut v = SparseVector::<u8, f64>::new();
        v.set(0, 2.0);
        v.set(2, -1.0);
        let dense = [3.0, 100.0, 4.0];
        assert_eq!(v.scalar_product(&dense), 2.0);
    }

    #[test]
    fn test_cursor_replaces_values() {
        let mut v = SparseVector::<u8, f64>::new();
        v.set(1, 1.0);
        v.set(4, 2.0);
        v.set(9, 3.0);

        let mut cursor = v.cursor();
        while let Some((_, value)) = cursor.next_entry() {
            cursor.set(value * 10.0);
        }

        assert_eq!(
            v.iter().collect::<Vec<_>>(),
            vec![(1, 10.0), (4, 20.0), (9, 30.0)]
        );
    }

    #[test]
    fn test_unweighted_cursor_cannot_clear_cells() {
        let mut v = SparseVector::<u8, bool>::new();
        v.set(2, 1.0);
        v.set(5, 1.0);
        {
            let mut cursor = v.cursor();
            while cursor.next_entry().is_some() {
                cursor.set(0.0);
            }
        }
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.get(5), 1.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "non-finite value")]
    fn test_set_rejects_nan() {
        let mut v = SparseVector::<u8, f64>::new();
        v.set(1, f64::NAN);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut v = SparseVector::<u8, f32>::new();
        v.set(1, 1.0);
        v.set(2, 2.0);
        assert!(v.remove(1));
        assert!(!v.remove(1));
        assert_eq!(v.nnz(), 1);
        v.clear();
        assert!(v.is_empty());
    }
}

//! Width-selecting construction of matrices and vectors
//!
//! Callers describe what they need, a shape and a [`ValueDomain`], and never
//! name a concrete representation. The factory picks the narrowest
//! [`IndexWidth`] able to address the shape and instantiates the generic
//! [`SparseMatrix`] / [`SparseVector`] for that `(index, value)` pair.
//!
//! The set of combinations is fixed (4 index widths × 8 value domains), so
//! dispatch is a generated `match` over monomorphized types; nothing is
//! looked up at run time beyond the two enum tags.
//!
//! # Examples
//!
//! ```
//! use latrec_sparse::factory::{MatrixFactory, ValueDomain};
//!
//! let mut m = MatrixFactory::new_matrix(200, 80, ValueDomain::Unweighted);
//! m.set(199, 3, 1.0);
//! assert_eq!(m.index_type(), "byte");
//! assert_eq!(m.weight_type(), "boolean");
//!
//! let big = MatrixFactory::new_matrix_named(300, 10, "float").unwrap();
//! assert_eq!(big.index_type(), "char");
//! assert!(MatrixFactory::new_matrix_named(3, 3, "complex").is_err());
//! ```

use crate::error::{SparseError, SparseResult};
use crate::index::IndexWidth;
use crate::matrix::{Matrix, SparseMatrix};
use crate::vector::{SparseVector, Vector};
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Value domain of a matrix or vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueDomain {
    /// Presence only (`bool`, no value storage)
    Unweighted,
    /// `i8`
    Byte,
    /// `i16`
    Short,
    /// `u16`
    Char,
    /// `i32`
    Int,
    /// `i64`
    Long,
    /// `f32`
    Float,
    /// `f64`
    Double,
}

impl ValueDomain {
    pub const ALL: [ValueDomain; 8] = [
        ValueDomain::Unweighted,
        ValueDomain::Byte,
        ValueDomain::Short,
        ValueDomain::Char,
        ValueDomain::Int,
        ValueDomain::Long,
        ValueDomain::Float,
        ValueDomain::Double,
    ];

    /// Descriptor string, identical to the `weight_type()` of the storage
    pub fn name(self) -> &'static str {
        match self {
            ValueDomain::Unweighted => "boolean",
            ValueDomain::Byte => "byte",
            ValueDomain::Short => "short",
            ValueDomain::Char => "char",
            ValueDomain::Int => "int",
            ValueDomain::Long => "long",
            ValueDomain::Float => "float",
            ValueDomain::Double => "double",
        }
    }

    /// Whether the domain holds fractional values
    pub fn is_floating(self) -> bool {
        matches!(self, ValueDomain::Float | ValueDomain::Double)
    }
}

impl fmt::Display for ValueDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueDomain {
    type Err = SparseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ValueDomain::ALL
            .iter()
            .copied()
            .find(|domain| domain.name() == s)
            .ok_or_else(|| SparseError::UnsupportedDomain(s.to_string()))
    }
}

/// Instantiate `$body` with `$I` bound to the index type of `$width` and `$W`
/// bound to the value type of `$domain`
macro_rules! with_widths {
    ($width:expr, $domain:expr, |$I:ident, $W:ident| $body:expr) => {
        match $width {
            IndexWidth::Byte => with_widths!(@value u8, $domain, $I, $W, $body),
            IndexWidth::Char => with_widths!(@value u16, $domain, $I, $W, $body),
            IndexWidth::Int => with_widths!(@value u32, $domain, $I, $W, $body),
            IndexWidth::Long => with_widths!(@value u64, $domain, $I, $W, $body),
        }
    };
    (@value $index:ty, $domain:expr, $I:ident, $W:ident, $body:expr) => {{
        type $I = $index;
        match $domain {
            ValueDomain::Unweighted => with_widths!(@bind bool, $W, $body),
            ValueDomain::Byte => with_widths!(@bind i8, $W, $body),
            ValueDomain::Short => with_widths!(@bind i16, $W, $body),
            ValueDomain::Char => with_widths!(@bind u16, $W, $body),
            ValueDomain::Int => with_widths!(@bind i32, $W, $body),
            ValueDomain::Long => with_widths!(@bind i64, $W, $body),
            ValueDomain::Float => with_widths!(@bind f32, $W, $body),
            ValueDomain::Double => with_widths!(@bind f64, $W, $body),
        }
    }};
    (@bind $value:ty, $W:ident, $body:expr) => {{
        type $W = $value;
        $body
    }};
}

/// Constructor namespace for width-selected sparse storage
pub struct MatrixFactory;

impl MatrixFactory {
    /// Empty `rows × cols` matrix over `domain`
    pub fn new_matrix(rows: usize, cols: usize, domain: ValueDomain) -> Box<dyn Matrix> {
        let width = IndexWidth::for_extent(rows.max(cols));
        trace!(rows, cols, %width, %domain, "allocating sparse matrix");
        with_widths!(width, domain, |I, W| {
            Box::new(SparseMatrix::<I, W>::new(rows, cols)) as Box<dyn Matrix>
        })
    }

    /// Empty `n × n` matrix over `domain` with symmetric storage
    pub fn new_symmetric(n: usize, domain: ValueDomain) -> Box<dyn Matrix> {
        let width = IndexWidth::for_extent(n);
        trace!(n, %width, %domain, "allocating symmetric sparse matrix");
        with_widths!(width, domain, |I, W| {
            Box::new(SparseMatrix::<I, W>::symmetric(n)) as Box<dyn Matrix>
        })
    }

    /// Empty matrix whose domain is given by its descriptor string
    pub fn new_matrix_named(rows: usize, cols: usize, domain: &str) -> SparseResult<Box<dyn Matrix>> {
        let domain = domain.parse::<ValueDomain>()?;
        Ok(Self::new_matrix(rows, cols, domain))
    }

    /// Empty square matrix with symmetric storage, checking the shape
    pub fn new_symmetric_checked(
        rows: usize,
        cols: usize,
        domain: ValueDomain,
    ) -> SparseResult<Box<dyn Matrix>> {
        if rows != cols {
            return Err(SparseError::NotSquare { rows, cols });
        }
        Ok(Self::new_symmetric(rows, domain))
    }

    /// Empty vector over `domain` whose indices stay below `extent`
    pub fn new_vector(extent: usize, domain: ValueDomain) -> Box<dyn Vector> {
        let width = IndexWidth::for_extent(extent);
        with_widths!(width, domain, |I, W| {
            Box::new(SparseVector::<I, W>::new()) as Box<dyn Vector>
        })
    }

    /// Same-shape, same-domain deep copy
    pub fn copy_matrix(matrix: &dyn Matrix) -> Box<dyn Matrix> {
        matrix.clone_boxed()
    }

    /// Same-domain deep copy
    pub fn copy_vector(vector: &dyn Vector) -> Box<dyn Vector> {
        vector.clone_boxed()
    }

    /// `f64` matrix holding the same cells as `matrix`, with general storage
    pub fn to_double(matrix: &dyn Matrix) -> Box<dyn Matrix> {
        let mut copy = Self::new_matrix(matrix.rows(), matrix.cols(), ValueDomain::Double);
        for (i, j, value) in matrix.entries() {
            copy.set(i, j, value);
        }
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_domain_roundtrips_its_name() {
        for domain in ValueDomain::ALL {
            assert_eq!(domain.name().parse::<ValueDomain>().unwrap(), domain);
            let m = MatrixFactory::new_matrix(4, 4, domain);
            assert_eq!(m.weight_type(), domain.name());
            let v = MatrixFactory::new_vector(4, domain);
            assert_eq!(v.weight_type(), domain.name());
        }
    }

    #[test]
    fn test_index_width_selection() {
        assert_eq!(MatrixFactory::new_matrix(256, 10, ValueDomain::Double).index_type(), "byte");
        assert_eq!(MatrixFactory::new_matrix(10, 257, ValueDomain::Double).index_type(), "char");
        assert_eq!(MatrixFactory::new_matrix(70_000, 1, ValueDomain::Int).index_type(), "int");
        assert_eq!(MatrixFactory::new_vector(1000, ValueDomain::Float).index_type(), "char");
    }

    #[test]
    fn test_unsupported_domain_rejected() {
        let err = MatrixFactory::new_matrix_named(2, 2, "decimal").unwrap_err();
        assert_eq!(err, SparseError::UnsupportedDomain("decimal".to_string()));
    }

    #[test]
    fn test_symmetric_requires_square() {
        assert!(MatrixFactory::new_symmetric_checked(3, 4, ValueDomain::Int).is_err());
        let m = MatrixFactory::new_symmetric_checked(3, 3, ValueDomain::Int).unwrap();
        assert!(m.is_symmetric());
    }

    #[test]
    fn test_copies_are_independent() {
        let mut m = MatrixFactory::new_matrix(3, 3, ValueDomain::Short);
        m.set(1, 2, 5.0);
        let mut copy = MatrixFactory::copy_matrix(m.as_ref());
        copy.set(1, 2, 9.0);
        assert_eq!(m.get(1, 2), 5.0);
        assert_eq!(copy.get(1, 2), 9.0);
        assert_eq!(copy.weight_type(), "short");

        let mut v = MatrixFactory::new_vector(10, ValueDomain::Long);
        v.set(3, 4.0);
        let w = MatrixFactory::copy_vector(v.as_ref());
        v.set(3, 1.0);
        assert_eq!(w.get(3), 4.0);
    }

    #[test]
    fn test_to_double_widens() {
        let mut m = MatrixFactory::new_symmetric(3, ValueDomain::Unweighted);
        m.set(0, 1, 1.0);
        let d = MatrixFactory::to_double(m.as_ref());
        assert_eq!(d.weight_type(), "double");
        assert!(!d.is_symmetric());
        assert_eq!(d.get(1, 0), 1.0);
        assert_eq!(d.nnz(), 2);
    }
}

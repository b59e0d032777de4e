//! Index widths for sparse storage
//!
//! Every sparse vector stores its active indices in the narrowest unsigned
//! integer that can address the extent of the owning matrix. A 200×80
//! adjacency matrix pays one byte per stored index, a 50 000-row one two.
//!
//! | width | Rust type | descriptor | addressable extent |
//! |-------|-----------|------------|--------------------|
//! | byte  | `u8`      | `"byte"`   | 256                |
//! | char  | `u16`     | `"char"`   | 65 536             |
//! | int   | `u32`     | `"int"`    | 2³²                |
//! | long  | `u64`     | `"long"`   | 2⁶⁴                |

use std::fmt;

/// An unsigned integer type usable as a stored sparse index
pub trait SparseIndex: Copy + Ord + fmt::Debug + Send + Sync + 'static {
    /// Descriptor reported through `index_type()`
    const NAME: &'static str;

    /// Number of distinct positions this width can address
    const EXTENT: u128;

    /// Narrow a position. Positions outside `EXTENT` wrap silently.
    fn from_usize(index: usize) -> Self;

    /// Widen back to a position
    fn to_usize(self) -> usize;
}

macro_rules! impl_sparse_index {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl SparseIndex for $ty {
                const NAME: &'static str = $name;
                const EXTENT: u128 = <$ty>::MAX as u128 + 1;

                #[inline]
                fn from_usize(index: usize) -> Self {
                    debug_assert!(
                        (index as u128) < Self::EXTENT,
                        "index {} not addressable by {} storage",
                        index,
                        $name
                    );
                    index as $ty
                }

                #[inline]
                fn to_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_sparse_index!(u8 => "byte", u16 => "char", u32 => "int", u64 => "long");

/// Runtime tag for the index widths instantiated by the factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexWidth {
    /// `u8` indices
    Byte,
    /// `u16` indices
    Char,
    /// `u32` indices
    Int,
    /// `u64` indices
    Long,
}

impl IndexWidth {
    /// Narrowest width able to address positions `0..extent`
    pub fn for_extent(extent: usize) -> Self {
        let extent = extent as u128;
        if extent <= u8::EXTENT {
            IndexWidth::Byte
        } else if extent <= u16::EXTENT {
            IndexWidth::Char
        } else if extent <= u32::EXTENT {
            IndexWidth::Int
        } else {
            IndexWidth::Long
        }
    }

    /// Descriptor string, identical to the matching [`SparseIndex::NAME`]
    pub fn name(self) -> &'static str {
        match self {
            IndexWidth::Byte => u8::NAME,
            IndexWidth::Char => u16::NAME,
            IndexWidth::Int => u32::NAME,
            IndexWidth::Long => u64::NAME,
        }
    }
}

impl fmt::Display for IndexWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

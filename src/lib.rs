//! Zero-copy transmuted views over strided multidimensional arrays.
//!
//! This crate provides the Rust counterpart of Julia's `TransmutedDimsArray`:
//! a view that reorders axes like `permutedims` and may additionally insert
//! trivial (length-1) axes at arbitrary positions, without touching the data.
//!
//! # Core Types
//!
//! - [`PermutationSpec`]: Validated, normalized permutation descriptor with its
//!   inverse and linear-access flag
//! - [`TransmuteView`]: Generalized permutation view over any [`ArraySource`]
//! - [`PermutedDimsView`] / [`TransposedView`]: Plain permutation and
//!   first-two-axes transpose wrappers
//! - [`StridedArray`], [`StridedView`], [`StridedViewMut`]: Strided storage usable
//!   as view sources
//!
//! # Descriptors
//!
//! A descriptor has one entry per output axis. Entry `k` in `1..=M` (where `M`
//! is the source rank) takes that axis from source dimension `k`; `0`, or any
//! value outside `1..=M`, inserts a length-1 axis. Element coordinates are
//! 0-based, and flat enumeration order is column-major everywhere.
//!
//! # Composition
//!
//! Building a [`TransmuteView`] over another [`TransmuteView`],
//! [`PermutedDimsView`] or [`TransposedView`] merges the permutations at
//! construction, so the resulting view always points at the innermost storage
//! and access cost stays `O(rank)` however long the chain was.
//!
//! # Example
//!
//! ```rust
//! use strided_transmute::{transmute, ArraySource, StridedArray};
//!
//! let a = StridedArray::<f64>::from_fn_col_major(&[3, 5, 4], |idx| {
//!     (idx[0] * 100 + idx[1] * 10 + idx[2]) as f64
//! });
//!
//! let v = transmute(&a, &[3, 0, 1, 2]).unwrap();
//! assert_eq!(v.dims(), &[4, 1, 3, 5]);
//! assert_eq!(v.get(&[2, 0, 0, 1]).unwrap(), a.get(&[0, 1, 2]).unwrap());
//!
//! // Undo the reordering, moving the inserted axis to the end. The composed
//! // view points straight at `a`.
//! let back = transmute(v, &[3, 4, 1, 2]).unwrap();
//! assert_eq!(back.perm(), &[1, 2, 3, 0]);
//! assert_eq!(back.dims(), &[3, 5, 4, 1]);
//! ```

#[macro_use]
mod macros;

mod array;
mod collapse;
mod iter;
mod ops;
mod perm;
mod source;
mod transmute;

// ============================================================================
// Storage types
// ============================================================================
pub use array::{col_major_strides, row_major_strides, StridedArray, StridedView, StridedViewMut};

// ============================================================================
// Capability interface
// ============================================================================
pub use source::{ArraySource, ArraySourceMut, Raw};

// ============================================================================
// Permutation algebra and views
// ============================================================================
pub use collapse::{permutedims, transpose, Describe, Described, PermutedDimsView, TransposedView};
pub use perm::PermutationSpec;
pub use transmute::{transmute, TransmuteView};

// ============================================================================
// Iteration and copies
// ============================================================================
pub use iter::{ColMajorIndices, Elements, TransmuteIter};
#[cfg(feature = "parallel")]
pub use ops::par_materialize;
pub use ops::{copy_into, materialize};

// ============================================================================
// Constants
// ============================================================================

/// Minimum number of elements before [`par_materialize`] splits work across threads.
///
/// Matches Julia's `MINTHREADLENGTH = 1 << 15`.
#[cfg(feature = "parallel")]
pub const MINTHREADLENGTH: usize = 1 << 15;

// ============================================================================
// Error types
// ============================================================================

/// Errors that can occur while building or accessing views.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StridedError {
    /// Descriptor does not reference every source dimension exactly once.
    #[error("invalid permutation {perm:?} for source rank {rank}")]
    InvalidPermutation { perm: Vec<usize>, rank: usize },

    /// Coordinate outside the extent of its axis.
    #[error("index {index} out of bounds for axis {axis} with extent {dim}")]
    OutOfBounds { axis: usize, index: usize, dim: usize },

    /// Flat position outside `[0, len)`.
    #[error("flat index {index} out of bounds for length {len}")]
    FlatIndexOutOfBounds { index: usize, len: usize },

    /// Operation refused because its meaning would be ambiguous for this view.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    /// Array ranks do not match.
    #[error("rank mismatch: {0} vs {1}")]
    RankMismatch(usize, usize),

    /// Array shapes are incompatible for the operation.
    #[error("shape mismatch: {0:?} vs {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// Stride array length doesn't match dimensions.
    #[error("stride and dims length mismatch")]
    StrideLengthMismatch,

    /// Integer overflow while computing array offset.
    #[error("offset overflow while computing pointer")]
    OffsetOverflow,
}

/// Result type for view operations.
pub type Result<T> = std::result::Result<T, StridedError>;

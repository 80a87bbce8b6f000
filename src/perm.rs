//! Validated generalized permutation descriptors.
//!
//! A descriptor lists, for every output axis, the 1-based source dimension it
//! is taken from, or `0` for an inserted length-1 axis. Entries outside
//! `1..=source_rank` are treated exactly like `0`.

use crate::source::{check_indices, SVec};
use crate::{Result, StridedError};

/// Normalized descriptor with its derived mappings.
///
/// Built once per view and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationSpec {
    perm: Box<[usize]>,
    inverse: Box<[usize]>,
    linear: bool,
}

impl PermutationSpec {
    /// Validate `descriptor` against a source of rank `source_rank`.
    ///
    /// # Errors
    /// [`StridedError::InvalidPermutation`] unless the in-range entries are
    /// exactly a permutation of `1..=source_rank`.
    pub fn new(descriptor: &[usize], source_rank: usize) -> Result<Self> {
        let perm: Box<[usize]> = descriptor
            .iter()
            .map(|&p| if (1..=source_rank).contains(&p) { p } else { 0 })
            .collect();

        let invalid = || StridedError::InvalidPermutation {
            perm: perm.to_vec(),
            rank: source_rank,
        };

        // usize::MAX marks a source dimension not seen yet.
        let mut inverse = vec![usize::MAX; source_rank];
        let mut linear = true;
        let mut last = 0;
        for (axis, &p) in perm.iter().enumerate() {
            if p == 0 {
                continue;
            }
            if inverse[p - 1] != usize::MAX {
                return Err(invalid());
            }
            inverse[p - 1] = axis;
            linear &= p > last;
            last = p;
        }
        if inverse.contains(&usize::MAX) {
            return Err(invalid());
        }

        Ok(Self {
            perm,
            inverse: inverse.into_boxed_slice(),
            linear,
        })
    }

    /// Identity descriptor `(1, 2, ..., rank)`.
    pub fn identity(rank: usize) -> Self {
        Self {
            perm: (1..=rank).collect(),
            inverse: (0..rank).collect(),
            linear: true,
        }
    }

    /// Normalized descriptor, one entry per output axis.
    #[inline]
    pub fn perm(&self) -> &[usize] {
        &self.perm
    }

    /// Output axis holding each source dimension (0-based).
    #[inline]
    pub fn inverse(&self) -> &[usize] {
        &self.inverse
    }

    /// Rank of the view.
    #[inline]
    pub fn rank(&self) -> usize {
        self.perm.len()
    }

    /// Rank of the source the descriptor was validated against.
    #[inline]
    pub fn source_rank(&self) -> usize {
        self.inverse.len()
    }

    /// True when flat enumeration of the view matches the source's.
    #[inline]
    pub fn is_linear(&self) -> bool {
        self.linear
    }

    /// True when the view is the source itself: linear, no inserted axes.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.linear && self.rank() == self.source_rank()
    }

    /// Output dims for a source with `source_dims`.
    pub fn dims(&self, source_dims: &[usize]) -> Vec<usize> {
        debug_assert_eq!(source_dims.len(), self.source_rank());
        self.perm
            .iter()
            .map(|&p| if p == 0 { 1 } else { source_dims[p - 1] })
            .collect()
    }

    /// Output strides for a source with `source_strides`. Inserted axes get stride 0.
    pub fn strides(&self, source_strides: &[isize]) -> Vec<isize> {
        debug_assert_eq!(source_strides.len(), self.source_rank());
        self.perm
            .iter()
            .map(|&p| if p == 0 { 0 } else { source_strides[p - 1] })
            .collect()
    }

    /// Translate view coordinates into source coordinates.
    ///
    /// `dims` are the view's dims; every coordinate is checked against them
    /// before translation.
    #[inline]
    pub(crate) fn source_coords(&self, dims: &[usize], indices: &[usize]) -> Result<SVec<usize>> {
        check_indices(dims, indices)?;
        Ok(self.inverse.iter().map(|&axis| indices[axis]).collect())
    }

    /// Compose this descriptor (the outer one) onto `inner`, a normalized
    /// descriptor relative to some deeper source.
    ///
    /// `self` must have been validated against `inner.len()` axes. The result
    /// is a descriptor relative to the deeper source:
    /// `composed[d] = 0` if `self[d] == 0`, else `inner[self[d]]`.
    pub fn compose(&self, inner: &[usize]) -> Vec<usize> {
        debug_assert_eq!(inner.len(), self.source_rank());
        self.perm
            .iter()
            .map(|&p| if p == 0 { 0 } else { inner[p - 1] })
            .collect()
    }
}

//! Generalized permutation views.
//!
//! [`TransmuteView`] reorders the axes of its source and may insert length-1
//! axes anywhere, without copying. Construction collapses nested
//! permutation-type views, so a `TransmuteView` always sits directly on raw
//! storage.

use std::sync::Arc;

use crate::collapse::{sealed, Describe, Described};
use crate::iter::{Elements, TransmuteIter};
use crate::perm::PermutationSpec;
use crate::source::ArraySource;
use crate::Result;

/// Zero-copy view whose axes are a generalized permutation of its source's.
///
/// Output axis `d` is source dimension `perm()[d]` (1-based), or an inserted
/// length-1 axis with stride 0 when `perm()[d] == 0`.
#[derive(Debug, Clone)]
pub struct TransmuteView<S> {
    source: S,
    spec: PermutationSpec,
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
}

impl<S: ArraySource> TransmuteView<S> {
    /// Build a view of `source` following `descriptor`.
    ///
    /// If `source` is itself a [`TransmuteView`], [`PermutedDimsView`] or
    /// [`TransposedView`], the permutations are merged and the view is built
    /// over the innermost source.
    ///
    /// [`PermutedDimsView`]: crate::PermutedDimsView
    /// [`TransposedView`]: crate::TransposedView
    ///
    /// # Errors
    /// [`StridedError::InvalidPermutation`](crate::StridedError::InvalidPermutation)
    /// if `descriptor` does not reference every axis of `source` exactly once.
    pub fn new<V>(source: V, descriptor: &[usize]) -> Result<Self>
    where
        V: Describe<Source = S>,
    {
        let Described {
            source,
            perm: inner,
        } = source.describe();

        let outer = PermutationSpec::new(descriptor, inner.len())?;
        let collapsed = inner.iter().copied().ne(1..=source.ndim());
        let spec = if collapsed {
            let composed = outer.compose(&inner);
            tracing::debug!(
                outer = ?outer.perm(),
                inner = ?inner,
                composed = ?composed,
                "collapsing nested view into a single transmute"
            );
            PermutationSpec::new(&composed, source.ndim())?
        } else {
            outer
        };

        let dims = spec.dims(source.dims());
        let strides = spec.strides(source.strides());
        tracing::trace!(perm = ?spec.perm(), dims = ?dims, linear = spec.is_linear(), "transmute view");
        Ok(Self {
            source,
            spec,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
        })
    }

    /// The validated permutation, relative to [`source`](Self::source).
    #[inline]
    pub fn spec(&self) -> &PermutationSpec {
        &self.spec
    }

    /// Normalized descriptor relative to [`source`](Self::source).
    #[inline]
    pub fn perm(&self) -> &[usize] {
        self.spec.perm()
    }

    #[inline]
    pub fn is_linear(&self) -> bool {
        self.spec.is_linear()
    }

    /// The raw source this view indexes.
    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Iterate elements in column-major view order.
    ///
    /// Linear views walk the source in its own order without translating
    /// coordinates.
    pub fn iter(&self) -> TransmuteIter<'_, S> {
        if self.spec.is_linear() {
            TransmuteIter::Linear(Elements::new(&self.source))
        } else {
            TransmuteIter::Translated(Elements::new(self))
        }
    }
}

impl_permuted_source!(TransmuteView);

impl<S> sealed::Sealed for TransmuteView<S> {}
impl<S> sealed::Sealed for &TransmuteView<S> {}

impl<S: ArraySource> Describe for TransmuteView<S> {
    type Source = S;

    fn describe(self) -> Described<S> {
        Described {
            perm: self.spec.perm().to_vec(),
            source: self.source,
        }
    }
}

impl<S: ArraySource + Clone> Describe for &TransmuteView<S> {
    type Source = S;

    fn describe(self) -> Described<S> {
        Described {
            perm: self.spec.perm().to_vec(),
            source: self.source.clone(),
        }
    }
}

/// Build a [`TransmuteView`] of `source` following `descriptor`.
///
/// Shorthand for [`TransmuteView::new`].
pub fn transmute<V: Describe>(source: V, descriptor: &[usize]) -> Result<TransmuteView<V::Source>> {
    TransmuteView::new(source, descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArraySourceMut, StridedArray, StridedError};

    fn make_array(dims: &[usize]) -> StridedArray<f64> {
        StridedArray::from_fn_col_major(dims, |idx| {
            idx.iter().fold(0.0, |acc, &i| acc * 10.0 + i as f64)
        })
    }

    #[test]
    fn test_insert_axis_and_reorder() {
        let a = make_array(&[3, 5, 4]);
        let v = transmute(&a, &[3, 0, 1, 2]).unwrap();
        assert_eq!(v.dims(), &[4, 1, 3, 5]);
        assert_eq!(v.strides(), &[15, 0, 1, 3]);
        assert_eq!(v.ndim(), 4);
        assert_eq!(v.len(), 60);
        assert!(!v.is_linear());
        assert_eq!(v.get(&[2, 0, 0, 1]).unwrap(), a.get(&[0, 1, 2]).unwrap());
        for i in 0..4 {
            for j in 0..3 {
                for k in 0..5 {
                    assert_eq!(v.get(&[i, 0, j, k]).unwrap(), a.get(&[j, k, i]).unwrap());
                }
            }
        }
    }

    #[test]
    fn test_transpose_descriptor() {
        let a = make_array(&[3, 4]);
        let v = transmute(&a, &[2, 1]).unwrap();
        assert_eq!(v.dims(), &[4, 3]);
        for i in 0..4 {
            for j in 0..3 {
                assert_eq!(v.get(&[i, j]).unwrap(), a.get(&[j, i]).unwrap());
            }
        }
    }

    #[test]
    fn test_out_of_bounds() {
        let a = make_array(&[3, 4]);
        let v = transmute(&a, &[0, 2, 1]).unwrap();
        assert_eq!(
            v.get(&[1, 0, 0]),
            Err(StridedError::OutOfBounds {
                axis: 0,
                index: 1,
                dim: 1
            })
        );
        assert_eq!(
            v.get(&[0, 4, 0]),
            Err(StridedError::OutOfBounds {
                axis: 1,
                index: 4,
                dim: 4
            })
        );
        assert_eq!(v.get(&[0, 0]), Err(StridedError::RankMismatch(2, 3)));
    }

    #[test]
    fn test_invalid_descriptor_propagates() {
        let a = make_array(&[3, 4]);
        let err = transmute(&a, &[1, 1]).unwrap_err();
        assert_eq!(
            err,
            StridedError::InvalidPermutation {
                perm: vec![1, 1],
                rank: 2
            }
        );
    }

    #[test]
    fn test_set_through_view() {
        let mut a = StridedArray::<i64>::col_major(&[2, 3]);
        {
            let mut v = transmute(&mut a, &[0, 2, 1]).unwrap();
            v.set(&[0, 2, 1], 7).unwrap();
            assert_eq!(v.get(&[0, 2, 1]).unwrap(), 7);
            assert!(v.set(&[0, 3, 1], 8).is_err());
        }
        assert_eq!(a.get(&[1, 2]).unwrap(), 7);
    }

    #[test]
    fn test_flat_offset_requires_linear() {
        let a = make_array(&[3, 4]);
        let t = transmute(&a, &[2, 1]).unwrap();
        assert!(matches!(
            t.flat_offset(1),
            Err(StridedError::UnsupportedOperation(_))
        ));
        assert_eq!(t.as_ptr(), a.as_ptr());

        let lin = transmute(&a, &[0, 1, 0, 2]).unwrap();
        assert!(lin.is_linear());
        for i in 0..12 {
            assert_eq!(lin.flat_offset(i).unwrap(), a.flat_offset(i).unwrap());
        }
    }

    #[test]
    fn test_iter_linear_and_translated() {
        let a = make_array(&[2, 3]);
        let lin = transmute(&a, &[1, 0, 2]).unwrap();
        let got: Vec<f64> = lin.iter().collect::<Result<_>>().unwrap();
        assert_eq!(got, a.data().to_vec());
        assert!(matches!(lin.iter(), TransmuteIter::Linear(_)));

        let t = transmute(&a, &[2, 1]).unwrap();
        let got: Vec<f64> = t.iter().collect::<Result<_>>().unwrap();
        assert_eq!(got, vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_get_flat_matches_iteration() {
        let a = make_array(&[2, 3, 2]);
        let v = transmute(&a, &[3, 1, 0, 2]).unwrap();
        let all: Vec<f64> = v.iter().collect::<Result<_>>().unwrap();
        for (i, &x) in all.iter().enumerate() {
            assert_eq!(v.get_flat(i).unwrap(), x);
        }
        assert!(v.get_flat(all.len()).is_err());
    }

    #[test]
    fn test_rank_zero_source() {
        let data = [5.0];
        let a = crate::StridedView::new(&data, &[], &[], 0).unwrap();
        let v = transmute(a, &[0, 0]).unwrap();
        assert_eq!(v.dims(), &[1, 1]);
        assert_eq!(v.get(&[0, 0]).unwrap(), 5.0);
    }
}

//! Composition of nested permutation views.
//!
//! Every view source either is raw storage or is one of three wrapper kinds:
//! [`TransmuteView`](crate::TransmuteView), [`PermutedDimsView`] and
//! [`TransposedView`]. [`Describe`] reduces any of them to the raw storage
//! underneath plus a single descriptor relative to it, so that building a
//! transmute view over a chain of wrappers yields one flat view.

use std::sync::Arc;

use crate::array::{StridedArray, StridedView, StridedViewMut};
use crate::perm::PermutationSpec;
use crate::source::{ArraySource, Raw};
use crate::{Result, StridedError};

/// Raw storage handle plus a normalized descriptor relative to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Described<S> {
    pub source: S,
    pub perm: Vec<usize>,
}

impl<S: ArraySource> Described<S> {
    /// Description of raw storage: the identity permutation.
    pub fn raw(source: S) -> Self {
        let perm = (1..=source.ndim()).collect();
        Self { source, perm }
    }
}

pub(crate) mod sealed {
    pub trait Sealed {}
}

/// Reduce a view source to raw storage and one descriptor.
///
/// Raw storage describes itself with the identity descriptor. Wrapper kinds
/// compose their own permutation onto their source's description, recursing
/// until raw storage is reached.
///
/// The set of implementors is closed. Foreign storage takes part through
/// [`Raw`]:
///
/// ```compile_fail
/// use strided_transmute::{Describe, Described, StridedArray};
///
/// struct Shuffled<'a>(&'a StridedArray<f64>);
///
/// impl<'a> Describe for Shuffled<'a> {
///     type Source = &'a StridedArray<f64>;
///
///     fn describe(self) -> Described<Self::Source> {
///         Described { source: self.0, perm: vec![2, 1] }
///     }
/// }
/// ```
pub trait Describe: sealed::Sealed {
    type Source: ArraySource;

    fn describe(self) -> Described<Self::Source>;
}

impl<T> sealed::Sealed for &StridedArray<T> {}
impl<T> sealed::Sealed for &mut StridedArray<T> {}
impl<T> sealed::Sealed for StridedView<'_, T> {}
impl<T> sealed::Sealed for StridedViewMut<'_, T> {}
impl<S> sealed::Sealed for Raw<S> {}
impl<S> sealed::Sealed for PermutedDimsView<S> {}
impl<S> sealed::Sealed for &PermutedDimsView<S> {}
impl<S> sealed::Sealed for TransposedView<S> {}
impl<S> sealed::Sealed for &TransposedView<S> {}

impl<'a, T: Copy> Describe for &'a StridedArray<T> {
    type Source = &'a StridedArray<T>;

    fn describe(self) -> Described<Self::Source> {
        Described::raw(self)
    }
}

impl<'a, T: Copy> Describe for &'a mut StridedArray<T> {
    type Source = &'a mut StridedArray<T>;

    fn describe(self) -> Described<Self::Source> {
        Described::raw(self)
    }
}

impl<'a, T: Copy> Describe for StridedView<'a, T> {
    type Source = StridedView<'a, T>;

    fn describe(self) -> Described<Self::Source> {
        Described::raw(self)
    }
}

impl<'a, T: Copy> Describe for StridedViewMut<'a, T> {
    type Source = StridedViewMut<'a, T>;

    fn describe(self) -> Described<Self::Source> {
        Described::raw(self)
    }
}

impl<S: ArraySource> Describe for Raw<S> {
    type Source = Raw<S>;

    fn describe(self) -> Described<Self::Source> {
        Described::raw(self)
    }
}

// ============================================================================
// PermutedDimsView
// ============================================================================

/// Plain axis permutation of a source (Julia's `PermutedDimsArray`).
///
/// `perm` is 1-based and must be a permutation of `1..=rank`. Unlike
/// [`TransmuteView`](crate::TransmuteView), the source is kept as given, so a
/// chain of these translates coordinates once per level. Wrap the chain in a
/// transmute view to collapse it.
#[derive(Debug, Clone)]
pub struct PermutedDimsView<S> {
    source: S,
    spec: PermutationSpec,
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
}

impl<S: ArraySource> PermutedDimsView<S> {
    /// # Errors
    /// [`StridedError::InvalidPermutation`] unless `perm` is a permutation of
    /// `1..=source.ndim()` with no inserted axes.
    pub fn new(source: S, perm: &[usize]) -> Result<Self> {
        let rank = source.ndim();
        let spec = PermutationSpec::new(perm, rank)?;
        if spec.rank() != rank {
            return Err(StridedError::InvalidPermutation {
                perm: spec.perm().to_vec(),
                rank,
            });
        }
        Ok(Self::from_spec(source, spec))
    }

    fn from_spec(source: S, spec: PermutationSpec) -> Self {
        let dims = spec.dims(source.dims());
        let strides = spec.strides(source.strides());
        Self {
            source,
            spec,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
        }
    }

    #[inline]
    pub fn perm(&self) -> &[usize] {
        self.spec.perm()
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

impl_permuted_source!(PermutedDimsView);

impl<S: Describe + ArraySource> Describe for PermutedDimsView<S> {
    type Source = S::Source;

    fn describe(self) -> Described<S::Source> {
        let inner = self.source.describe();
        Described {
            perm: self.spec.compose(&inner.perm),
            source: inner.source,
        }
    }
}

impl<S: Describe + ArraySource + Clone> Describe for &PermutedDimsView<S> {
    type Source = S::Source;

    fn describe(self) -> Described<S::Source> {
        let inner = self.source.clone().describe();
        Described {
            perm: self.spec.compose(&inner.perm),
            source: inner.source,
        }
    }
}

/// Permute the axes of `source`. `perm` is 1-based.
pub fn permutedims<S: ArraySource>(source: S, perm: &[usize]) -> Result<PermutedDimsView<S>> {
    PermutedDimsView::new(source, perm)
}

// ============================================================================
// TransposedView
// ============================================================================

/// Swap of the first two axes of a source, equivalent to the descriptor
/// `(2, 1, 3, 4, ...)` over the source's rank.
#[derive(Debug, Clone)]
pub struct TransposedView<S> {
    source: S,
    spec: PermutationSpec,
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
}

impl<S: ArraySource> TransposedView<S> {
    /// # Errors
    /// [`StridedError::RankMismatch`] if `source` has fewer than two axes.
    pub fn new(source: S) -> Result<Self> {
        let rank = source.ndim();
        if rank < 2 {
            return Err(StridedError::RankMismatch(rank, 2));
        }
        let mut perm: Vec<usize> = (1..=rank).collect();
        perm.swap(0, 1);
        let spec = PermutationSpec::new(&perm, rank)?;
        let dims = spec.dims(source.dims());
        let strides = spec.strides(source.strides());
        Ok(Self {
            source,
            spec,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
        })
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

impl_permuted_source!(TransposedView);

impl<S: Describe + ArraySource> Describe for TransposedView<S> {
    type Source = S::Source;

    fn describe(self) -> Described<S::Source> {
        let inner = self.source.describe();
        Described {
            perm: self.spec.compose(&inner.perm),
            source: inner.source,
        }
    }
}

impl<S: Describe + ArraySource + Clone> Describe for &TransposedView<S> {
    type Source = S::Source;

    fn describe(self) -> Described<S::Source> {
        let inner = self.source.clone().describe();
        Described {
            perm: self.spec.compose(&inner.perm),
            source: inner.source,
        }
    }
}

/// Swap the first two axes of `source`.
pub fn transpose<S: ArraySource>(source: S) -> Result<TransposedView<S>> {
    TransposedView::new(source)
}

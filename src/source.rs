//! Capability interface for anything a view can sit on top of.
//!
//! A source exposes ordered dims and strides, bounds-checked element access by
//! coordinate, and a first-element pointer. Flat helpers have default
//! implementations in terms of those, using column-major enumeration order.

use smallvec::SmallVec;

use crate::iter::ColMajorIndices;
use crate::{Result, StridedError};

pub(crate) type SVec<T> = SmallVec<[T; 8]>;

/// Read access to a multidimensional array.
///
/// Storage backends that live outside this crate (device buffers, foreign
/// tensors, ...) implement this trait to become usable as view sources. Wrap
/// them in [`Raw`] when building a [`TransmuteView`](crate::TransmuteView) over
/// them.
pub trait ArraySource {
    type Elem: Copy;

    /// Extent of each axis.
    fn dims(&self) -> &[usize];

    /// Stride of each axis, in elements.
    fn strides(&self) -> &[isize];

    /// Bounds-checked element read.
    fn get(&self, indices: &[usize]) -> Result<Self::Elem>;

    /// Raw pointer to the element at coordinate `[0, 0, ...]`.
    fn as_ptr(&self) -> *const Self::Elem;

    #[inline]
    fn ndim(&self) -> usize {
        self.dims().len()
    }

    #[inline]
    fn len(&self) -> usize {
        self.dims().iter().product()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.dims().iter().any(|&d| d == 0)
    }

    /// Storage offset, relative to [`as_ptr`](Self::as_ptr), of flat position `index`.
    fn flat_offset(&self, index: usize) -> Result<isize> {
        let coords = unravel_col_major(self.dims(), index)?;
        Ok(coords
            .iter()
            .zip(self.strides())
            .map(|(&c, &s)| c as isize * s)
            .sum())
    }

    /// Element at flat position `index` in column-major order.
    fn get_flat(&self, index: usize) -> Result<Self::Elem> {
        let coords = unravel_col_major(self.dims(), index)?;
        self.get(&coords)
    }

    /// Visit every element in column-major order.
    fn for_each_flat(&self, f: &mut dyn FnMut(Self::Elem)) -> Result<()> {
        for_each_col_major(self, f)
    }
}

/// Write access to a multidimensional array.
pub trait ArraySourceMut: ArraySource {
    /// Bounds-checked element write.
    fn set(&mut self, indices: &[usize], value: Self::Elem) -> Result<()>;

    fn set_flat(&mut self, index: usize, value: Self::Elem) -> Result<()> {
        let coords = unravel_col_major(self.dims(), index)?;
        self.set(&coords, value)
    }
}

impl<S: ArraySource + ?Sized> ArraySource for &S {
    type Elem = S::Elem;

    #[inline]
    fn dims(&self) -> &[usize] {
        (**self).dims()
    }

    #[inline]
    fn strides(&self) -> &[isize] {
        (**self).strides()
    }

    #[inline]
    fn get(&self, indices: &[usize]) -> Result<S::Elem> {
        (**self).get(indices)
    }

    #[inline]
    fn as_ptr(&self) -> *const S::Elem {
        (**self).as_ptr()
    }

    fn flat_offset(&self, index: usize) -> Result<isize> {
        (**self).flat_offset(index)
    }

    fn get_flat(&self, index: usize) -> Result<S::Elem> {
        (**self).get_flat(index)
    }

    fn for_each_flat(&self, f: &mut dyn FnMut(S::Elem)) -> Result<()> {
        (**self).for_each_flat(f)
    }
}

impl<S: ArraySource + ?Sized> ArraySource for &mut S {
    type Elem = S::Elem;

    #[inline]
    fn dims(&self) -> &[usize] {
        (**self).dims()
    }

    #[inline]
    fn strides(&self) -> &[isize] {
        (**self).strides()
    }

    #[inline]
    fn get(&self, indices: &[usize]) -> Result<S::Elem> {
        (**self).get(indices)
    }

    #[inline]
    fn as_ptr(&self) -> *const S::Elem {
        (**self).as_ptr()
    }

    fn flat_offset(&self, index: usize) -> Result<isize> {
        (**self).flat_offset(index)
    }

    fn get_flat(&self, index: usize) -> Result<S::Elem> {
        (**self).get_flat(index)
    }

    fn for_each_flat(&self, f: &mut dyn FnMut(S::Elem)) -> Result<()> {
        (**self).for_each_flat(f)
    }
}

impl<S: ArraySourceMut + ?Sized> ArraySourceMut for &mut S {
    #[inline]
    fn set(&mut self, indices: &[usize], value: S::Elem) -> Result<()> {
        (**self).set(indices, value)
    }

    fn set_flat(&mut self, index: usize, value: S::Elem) -> Result<()> {
        (**self).set_flat(index, value)
    }
}

/// Terminal source adapter.
///
/// Marks an arbitrary [`ArraySource`] as raw storage: composition stops here
/// and views built over it index it directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Raw<S>(pub S);

impl<S> Raw<S> {
    pub fn into_inner(self) -> S {
        self.0
    }
}

impl<S: ArraySource> ArraySource for Raw<S> {
    type Elem = S::Elem;

    #[inline]
    fn dims(&self) -> &[usize] {
        self.0.dims()
    }

    #[inline]
    fn strides(&self) -> &[isize] {
        self.0.strides()
    }

    #[inline]
    fn get(&self, indices: &[usize]) -> Result<S::Elem> {
        self.0.get(indices)
    }

    #[inline]
    fn as_ptr(&self) -> *const S::Elem {
        self.0.as_ptr()
    }

    fn flat_offset(&self, index: usize) -> Result<isize> {
        self.0.flat_offset(index)
    }

    fn get_flat(&self, index: usize) -> Result<S::Elem> {
        self.0.get_flat(index)
    }

    fn for_each_flat(&self, f: &mut dyn FnMut(S::Elem)) -> Result<()> {
        self.0.for_each_flat(f)
    }
}

impl<S: ArraySourceMut> ArraySourceMut for Raw<S> {
    #[inline]
    fn set(&mut self, indices: &[usize], value: S::Elem) -> Result<()> {
        self.0.set(indices, value)
    }

    fn set_flat(&mut self, index: usize, value: S::Elem) -> Result<()> {
        self.0.set_flat(index, value)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Split a column-major flat position into per-axis coordinates.
pub(crate) fn unravel_col_major(dims: &[usize], index: usize) -> Result<SVec<usize>> {
    let len: usize = dims.iter().product();
    if index >= len {
        return Err(StridedError::FlatIndexOutOfBounds { index, len });
    }
    let mut rest = index;
    let mut coords = SVec::with_capacity(dims.len());
    for &d in dims {
        coords.push(rest % d);
        rest /= d;
    }
    Ok(coords)
}

/// Check a coordinate tuple against `dims`.
#[inline]
pub(crate) fn check_indices(dims: &[usize], indices: &[usize]) -> Result<()> {
    if indices.len() != dims.len() {
        return Err(StridedError::RankMismatch(indices.len(), dims.len()));
    }
    for (axis, (&index, &dim)) in indices.iter().zip(dims).enumerate() {
        if index >= dim {
            return Err(StridedError::OutOfBounds { axis, index, dim });
        }
    }
    Ok(())
}

/// Visit every element of `src` by walking its coordinates in column-major order.
pub(crate) fn for_each_col_major<S: ArraySource + ?Sized>(
    src: &S,
    f: &mut dyn FnMut(S::Elem),
) -> Result<()> {
    for idx in ColMajorIndices::new(src.dims()) {
        f(src.get(&idx)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unravel_col_major() {
        assert_eq!(unravel_col_major(&[2, 3], 0).unwrap().as_slice(), &[0, 0]);
        assert_eq!(unravel_col_major(&[2, 3], 1).unwrap().as_slice(), &[1, 0]);
        assert_eq!(unravel_col_major(&[2, 3], 5).unwrap().as_slice(), &[1, 2]);
        assert_eq!(
            unravel_col_major(&[2, 3], 6),
            Err(StridedError::FlatIndexOutOfBounds { index: 6, len: 6 })
        );
    }

    #[test]
    fn test_unravel_rank_zero() {
        assert!(unravel_col_major(&[], 0).unwrap().is_empty());
        assert!(unravel_col_major(&[], 1).is_err());
    }

    #[test]
    fn test_check_indices() {
        assert!(check_indices(&[2, 3], &[1, 2]).is_ok());
        assert_eq!(
            check_indices(&[2, 3], &[1, 3]),
            Err(StridedError::OutOfBounds {
                axis: 1,
                index: 3,
                dim: 3
            })
        );
        assert_eq!(
            check_indices(&[2, 3], &[1]),
            Err(StridedError::RankMismatch(1, 2))
        );
    }
}

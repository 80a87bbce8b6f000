//! Strided storage types that act as raw view sources.
//!
//! - [`StridedView`]: Immutable dynamic-rank strided view over a borrowed slice
//! - [`StridedViewMut`]: Mutable dynamic-rank strided view over a borrowed slice
//! - [`StridedArray`]: Owned strided multidimensional array
//!
//! All three are terminal sources: a [`TransmuteView`](crate::TransmuteView)
//! built over them indexes their memory directly.

use std::sync::Arc;

use crate::source::{check_indices, for_each_col_major, ArraySource, ArraySourceMut};
use crate::{Result, StridedError};

// ============================================================================
// Validation helpers
// ============================================================================

/// Validate that all accessed offsets stay within `[0, len)`.
fn validate_bounds(len: usize, dims: &[usize], strides: &[isize], offset: isize) -> Result<()> {
    if dims.len() != strides.len() {
        return Err(StridedError::StrideLengthMismatch);
    }
    // Empty array - no access needed
    if dims.iter().any(|&d| d == 0) {
        return Ok(());
    }
    let mut min_offset = offset;
    let mut max_offset = offset;
    for (&dim, &stride) in dims.iter().zip(strides.iter()) {
        if dim > 1 {
            let end = stride
                .checked_mul(dim as isize - 1)
                .ok_or(StridedError::OffsetOverflow)?;
            if end >= 0 {
                max_offset = max_offset
                    .checked_add(end)
                    .ok_or(StridedError::OffsetOverflow)?;
            } else {
                min_offset = min_offset
                    .checked_add(end)
                    .ok_or(StridedError::OffsetOverflow)?;
            }
        }
    }
    if min_offset < 0 || max_offset < 0 {
        return Err(StridedError::OffsetOverflow);
    }
    if max_offset as usize >= len {
        return Err(StridedError::OffsetOverflow);
    }
    Ok(())
}

/// Compute column-major strides (Julia default: first index varies fastest).
///
/// # Errors
/// [`StridedError::OffsetOverflow`] if a stride does not fit in `isize`.
pub fn col_major_strides(dims: &[usize]) -> Result<Vec<isize>> {
    let rank = dims.len();
    let mut strides = vec![1isize; rank];
    for i in 1..rank {
        strides[i] = stride_step(strides[i - 1], dims[i - 1])?;
    }
    Ok(strides)
}

/// Compute row-major strides (C default: last index varies fastest).
///
/// # Errors
/// [`StridedError::OffsetOverflow`] if a stride does not fit in `isize`.
pub fn row_major_strides(dims: &[usize]) -> Result<Vec<isize>> {
    let rank = dims.len();
    let mut strides = vec![1isize; rank];
    for i in (0..rank.saturating_sub(1)).rev() {
        strides[i] = stride_step(strides[i + 1], dims[i + 1])?;
    }
    Ok(strides)
}

#[inline]
fn stride_step(stride: isize, dim: usize) -> Result<isize> {
    isize::try_from(dim)
        .ok()
        .and_then(|d| stride.checked_mul(d))
        .ok_or(StridedError::OffsetOverflow)
}

/// Data index of a checked coordinate tuple.
#[inline]
fn data_index(dims: &[usize], strides: &[isize], offset: isize, indices: &[usize]) -> Result<usize> {
    check_indices(dims, indices)?;
    let idx = indices
        .iter()
        .zip(strides)
        .fold(offset, |acc, (&i, &s)| acc + i as isize * s);
    Ok(idx as usize)
}

// ============================================================================
// StridedView
// ============================================================================

/// Dynamic-rank immutable strided view over a borrowed slice.
pub struct StridedView<'a, T> {
    data: &'a [T],
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: isize,
}

impl<T> Clone for StridedView<'_, T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for StridedView<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedView")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, T> StridedView<'a, T> {
    /// Create a new immutable strided view from a borrowed slice.
    ///
    /// # Errors
    /// Returns an error if the view would access out-of-bounds memory.
    pub fn new(data: &'a [T], dims: &[usize], strides: &[isize], offset: isize) -> Result<Self> {
        validate_bounds(data.len(), dims, strides, offset)?;
        Ok(Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset,
        })
    }

    #[inline]
    pub fn offset(&self) -> isize {
        self.offset
    }

    #[inline]
    pub fn data(&self) -> &'a [T] {
        self.data
    }
}

impl<T: Copy> ArraySource for StridedView<'_, T> {
    type Elem = T;

    #[inline]
    fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    fn get(&self, indices: &[usize]) -> Result<T> {
        let idx = data_index(&self.dims, &self.strides, self.offset, indices)?;
        Ok(self.data[idx])
    }

    #[inline]
    fn as_ptr(&self) -> *const T {
        self.data.as_ptr().wrapping_offset(self.offset)
    }
}

// ============================================================================
// StridedViewMut
// ============================================================================

/// Dynamic-rank mutable strided view over a borrowed slice.
pub struct StridedViewMut<'a, T> {
    data: &'a mut [T],
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: isize,
}

impl<T: std::fmt::Debug> std::fmt::Debug for StridedViewMut<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedViewMut")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<'a, T> StridedViewMut<'a, T> {
    /// Create a new mutable strided view.
    ///
    /// Strides must not alias two coordinates onto one element; this is not checked.
    pub fn new(
        data: &'a mut [T],
        dims: &[usize],
        strides: &[isize],
        offset: isize,
    ) -> Result<Self> {
        validate_bounds(data.len(), dims, strides, offset)?;
        Ok(Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset,
        })
    }

    #[inline]
    pub fn offset(&self) -> isize {
        self.offset
    }

    /// Reborrow as an immutable view.
    pub fn as_view(&self) -> StridedView<'_, T> {
        StridedView {
            data: &self.data[..],
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }
}

impl<T: Copy> ArraySource for StridedViewMut<'_, T> {
    type Elem = T;

    #[inline]
    fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    fn get(&self, indices: &[usize]) -> Result<T> {
        let idx = data_index(&self.dims, &self.strides, self.offset, indices)?;
        Ok(self.data[idx])
    }

    #[inline]
    fn as_ptr(&self) -> *const T {
        self.data.as_ptr().wrapping_offset(self.offset)
    }
}

impl<T: Copy> ArraySourceMut for StridedViewMut<'_, T> {
    #[inline]
    fn set(&mut self, indices: &[usize], value: T) -> Result<()> {
        let idx = data_index(&self.dims, &self.strides, self.offset, indices)?;
        self.data[idx] = value;
        Ok(())
    }
}

// ============================================================================
// StridedArray
// ============================================================================

/// Owned strided multidimensional array.
///
/// Supports both column-major (Julia default) and row-major (C default) layouts.
pub struct StridedArray<T> {
    data: Vec<T>,
    dims: Arc<[usize]>,
    strides: Arc<[isize]>,
    offset: isize,
}

impl<T: std::fmt::Debug> std::fmt::Debug for StridedArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StridedArray")
            .field("dims", &self.dims)
            .field("strides", &self.strides)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<T: Clone> Clone for StridedArray<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }
}

impl<T: Clone + Default> StridedArray<T> {
    /// Create a column-major (Julia default) array filled with Default values.
    ///
    /// # Panics
    /// Panics if the strides of `dims` overflow `isize`.
    pub fn col_major(dims: &[usize]) -> Self {
        let total: usize = dims.iter().product();
        Self {
            data: vec![T::default(); total],
            dims: Arc::from(dims),
            strides: Arc::from(col_major_strides(dims).expect("col-major strides overflow")),
            offset: 0,
        }
    }

    /// Create a row-major (C default) array filled with Default values.
    ///
    /// # Panics
    /// Panics if the strides of `dims` overflow `isize`.
    pub fn row_major(dims: &[usize]) -> Self {
        let total: usize = dims.iter().product();
        Self {
            data: vec![T::default(); total],
            dims: Arc::from(dims),
            strides: Arc::from(row_major_strides(dims).expect("row-major strides overflow")),
            offset: 0,
        }
    }
}

impl<T> StridedArray<T> {
    /// Create a column-major array with values produced by a function.
    ///
    /// The function is called with indices in column-major iteration order.
    ///
    /// # Panics
    /// Panics if the strides of `dims` overflow `isize`.
    pub fn from_fn_col_major(dims: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Self {
        let total: usize = dims.iter().product();
        let rank = dims.len();
        let mut data = Vec::with_capacity(total);
        let mut idx = vec![0usize; rank];
        for _ in 0..total {
            data.push(f(&idx));
            for d in 0..rank {
                idx[d] += 1;
                if idx[d] < dims[d] {
                    break;
                }
                idx[d] = 0;
            }
        }
        Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(col_major_strides(dims).expect("col-major strides overflow")),
            offset: 0,
        }
    }

    /// Create a row-major array with values produced by a function.
    ///
    /// The function is called with indices in row-major iteration order.
    ///
    /// # Panics
    /// Panics if the strides of `dims` overflow `isize`.
    pub fn from_fn_row_major(dims: &[usize], mut f: impl FnMut(&[usize]) -> T) -> Self {
        let total: usize = dims.iter().product();
        let rank = dims.len();
        let mut data = Vec::with_capacity(total);
        let mut idx = vec![0usize; rank];
        for _ in 0..total {
            data.push(f(&idx));
            for d in (0..rank).rev() {
                idx[d] += 1;
                if idx[d] < dims[d] {
                    break;
                }
                idx[d] = 0;
            }
        }
        Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(row_major_strides(dims).expect("row-major strides overflow")),
            offset: 0,
        }
    }

    /// Create from raw parts.
    pub fn from_parts(
        data: Vec<T>,
        dims: &[usize],
        strides: &[isize],
        offset: isize,
    ) -> Result<Self> {
        validate_bounds(data.len(), dims, strides, offset)?;
        Ok(Self {
            data,
            dims: Arc::from(dims),
            strides: Arc::from(strides),
            offset,
        })
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Create an immutable view over this array.
    pub fn view(&self) -> StridedView<'_, T> {
        StridedView {
            data: &self.data,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }

    /// Create a mutable view over this array.
    pub fn view_mut(&mut self) -> StridedViewMut<'_, T> {
        StridedViewMut {
            data: &mut self.data,
            dims: self.dims.clone(),
            strides: self.strides.clone(),
            offset: self.offset,
        }
    }

    /// True when the data is column-major with no gaps, so memory order equals
    /// flat order.
    pub fn is_col_major_contiguous(&self) -> bool {
        self.offset == 0
            && self.data.len() == self.dims.iter().product::<usize>()
            && col_major_strides(&self.dims).is_ok_and(|s| *self.strides == *s)
    }
}

impl<T: Copy> ArraySource for StridedArray<T> {
    type Elem = T;

    #[inline]
    fn dims(&self) -> &[usize] {
        &self.dims
    }

    #[inline]
    fn strides(&self) -> &[isize] {
        &self.strides
    }

    #[inline]
    fn get(&self, indices: &[usize]) -> Result<T> {
        let idx = data_index(&self.dims, &self.strides, self.offset, indices)?;
        Ok(self.data[idx])
    }

    #[inline]
    fn as_ptr(&self) -> *const T {
        self.data.as_ptr().wrapping_offset(self.offset)
    }

    fn for_each_flat(&self, f: &mut dyn FnMut(T)) -> Result<()> {
        if self.is_col_major_contiguous() {
            self.data.iter().for_each(|&x| f(x));
            return Ok(());
        }
        for_each_col_major(self, f)
    }
}

impl<T: Copy> ArraySourceMut for StridedArray<T> {
    #[inline]
    fn set(&mut self, indices: &[usize], value: T) -> Result<()> {
        let idx = data_index(&self.dims, &self.strides, self.offset, indices)?;
        self.data[idx] = value;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

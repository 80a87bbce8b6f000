//! Column-major iteration over sources.

use crate::source::{ArraySource, SVec};
use crate::transmute::TransmuteView;
use crate::Result;

/// Iterator over all coordinate tuples of a shape, first index fastest.
#[derive(Debug, Clone)]
pub struct ColMajorIndices {
    dims: SVec<usize>,
    current: SVec<usize>,
    remaining: usize,
}

impl ColMajorIndices {
    pub fn new(dims: &[usize]) -> Self {
        Self {
            dims: SVec::from_slice(dims),
            current: SVec::from_elem(0, dims.len()),
            remaining: dims.iter().product(),
        }
    }
}

impl Iterator for ColMajorIndices {
    type Item = SVec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let out = self.current.clone();
        for d in 0..self.dims.len() {
            self.current[d] += 1;
            if self.current[d] < self.dims[d] {
                break;
            }
            self.current[d] = 0;
        }
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ColMajorIndices {}

/// Iterator over the elements of a source in column-major order.
///
/// Yields `Result` because sources report their own access failures.
pub struct Elements<'a, S: ArraySource + ?Sized> {
    src: &'a S,
    indices: ColMajorIndices,
}

impl<'a, S: ArraySource + ?Sized> Elements<'a, S> {
    pub fn new(src: &'a S) -> Self {
        Self {
            src,
            indices: ColMajorIndices::new(src.dims()),
        }
    }
}

impl<S: ArraySource + ?Sized> Iterator for Elements<'_, S> {
    type Item = Result<S::Elem>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.indices.next()?;
        Some(self.src.get(&idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<S: ArraySource + ?Sized> ExactSizeIterator for Elements<'_, S> {}

/// Element iterator of a [`TransmuteView`].
///
/// Linear views walk the source in its own order; the others translate every
/// coordinate through the view's permutation.
pub enum TransmuteIter<'a, S: ArraySource> {
    Linear(Elements<'a, S>),
    Translated(Elements<'a, TransmuteView<S>>),
}

impl<S: ArraySource> Iterator for TransmuteIter<'_, S> {
    type Item = Result<S::Elem>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match self {
            TransmuteIter::Linear(it) => it.next(),
            TransmuteIter::Translated(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            TransmuteIter::Linear(it) => it.size_hint(),
            TransmuteIter::Translated(it) => it.size_hint(),
        }
    }
}

impl<S: ArraySource> ExactSizeIterator for TransmuteIter<'_, S> {}

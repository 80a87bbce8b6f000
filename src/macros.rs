//! Shared `ArraySource` plumbing for the permutation-backed view types.
//!
//! Each type using these macros has the fields `source`, `spec`, `dims` and
//! `strides`, with `dims`/`strides` cached from `spec` at construction.

macro_rules! impl_permuted_source {
    ($ty:ident) => {
        impl<S: $crate::ArraySource> $crate::ArraySource for $ty<S> {
            type Elem = S::Elem;

            #[inline]
            fn dims(&self) -> &[usize] {
                &self.dims
            }

            #[inline]
            fn strides(&self) -> &[isize] {
                &self.strides
            }

            #[inline]
            fn get(&self, indices: &[usize]) -> $crate::Result<S::Elem> {
                let coords = self.spec.source_coords(&self.dims, indices)?;
                self.source.get(&coords)
            }

            #[inline]
            fn as_ptr(&self) -> *const S::Elem {
                self.source.as_ptr()
            }

            fn flat_offset(&self, index: usize) -> $crate::Result<isize> {
                if !self.spec.is_linear() {
                    return Err($crate::StridedError::UnsupportedOperation(
                        "flat offset of a view that reorders its source",
                    ));
                }
                self.source.flat_offset(index)
            }

            fn get_flat(&self, index: usize) -> $crate::Result<S::Elem> {
                if self.spec.is_linear() {
                    return self.source.get_flat(index);
                }
                let coords = $crate::source::unravel_col_major(&self.dims, index)?;
                self.get(&coords)
            }

            fn for_each_flat(&self, f: &mut dyn FnMut(S::Elem)) -> $crate::Result<()> {
                if self.spec.is_linear() {
                    return self.source.for_each_flat(f);
                }
                $crate::source::for_each_col_major(self, f)
            }
        }

        impl<S: $crate::ArraySourceMut> $crate::ArraySourceMut for $ty<S> {
            #[inline]
            fn set(&mut self, indices: &[usize], value: S::Elem) -> $crate::Result<()> {
                let coords = self.spec.source_coords(&self.dims, indices)?;
                self.source.set(&coords, value)
            }

            fn set_flat(&mut self, index: usize, value: S::Elem) -> $crate::Result<()> {
                if self.spec.is_linear() {
                    return self.source.set_flat(index, value);
                }
                let coords = $crate::source::unravel_col_major(&self.dims, index)?;
                self.set(&coords, value)
            }
        }
    };
}

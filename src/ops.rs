//! Copies out of views: materialization into fresh storage and element-wise
//! copy between sources of equal shape.

use crate::array::{col_major_strides, StridedArray};
use crate::iter::ColMajorIndices;
use crate::source::{ArraySource, ArraySourceMut};
use crate::{Result, StridedError};

/// Fail unless `a` and `b` are the same shape.
fn ensure_same_shape(a: &[usize], b: &[usize]) -> Result<()> {
    if a != b {
        return Err(StridedError::ShapeMismatch(a.to_vec(), b.to_vec()));
    }
    Ok(())
}

/// Copy `src` into a new column-major [`StridedArray`] with the same dims.
///
/// Elements are read in `src`'s own column-major order, so a linear
/// [`TransmuteView`](crate::TransmuteView) is read straight through its source.
pub fn materialize<S: ArraySource + ?Sized>(src: &S) -> Result<StridedArray<S::Elem>> {
    let dims = src.dims();
    let mut data = Vec::with_capacity(src.len());
    src.for_each_flat(&mut |x| data.push(x))?;
    tracing::trace!(dims = ?dims, len = data.len(), "materialized view");
    StridedArray::from_parts(data, dims, &col_major_strides(dims)?, 0)
}

/// Parallel [`materialize`], splitting the flat range across the rayon pool.
///
/// Sources shorter than [`MINTHREADLENGTH`](crate::MINTHREADLENGTH) are copied
/// sequentially.
#[cfg(feature = "parallel")]
pub fn par_materialize<S>(src: &S) -> Result<StridedArray<S::Elem>>
where
    S: ArraySource + Sync + ?Sized,
    S::Elem: Send,
{
    use rayon::prelude::*;

    let len = src.len();
    if len < crate::MINTHREADLENGTH {
        return materialize(src);
    }
    let data = (0..len)
        .into_par_iter()
        .map(|i| src.get_flat(i))
        .collect::<Result<Vec<_>>>()?;
    tracing::trace!(dims = ?src.dims(), len, "materialized view in parallel");
    StridedArray::from_parts(data, src.dims(), &col_major_strides(src.dims())?, 0)
}

/// Copy `src` into `dest` element by element.
///
/// # Errors
/// [`StridedError::ShapeMismatch`] if the dims differ.
pub fn copy_into<D, S>(dest: &mut D, src: &S) -> Result<()>
where
    D: ArraySourceMut + ?Sized,
    S: ArraySource<Elem = D::Elem> + ?Sized,
{
    ensure_same_shape(dest.dims(), src.dims())?;
    for idx in ColMajorIndices::new(src.dims()) {
        dest.set(&idx, src.get(&idx)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{transmute, StridedView};

    #[test]
    fn test_materialize_transposed() {
        let a = StridedArray::<i32>::from_fn_row_major(&[2, 3], |idx| (idx[0] * 3 + idx[1]) as i32);
        let t = transmute(&a, &[2, 1]).unwrap();
        let m = materialize(&t).unwrap();
        assert_eq!(m.dims(), &[3, 2]);
        assert_eq!(m.strides(), &[1, 3]);
        for i in 0..3 {
            for j in 0..2 {
                assert_eq!(m.get(&[i, j]).unwrap(), a.get(&[j, i]).unwrap());
            }
        }
    }

    #[test]
    fn test_materialize_linear_view_keeps_order() {
        let data: Vec<u8> = (0..6).collect();
        let a = StridedView::new(&data, &[2, 3], &[1, 2], 0).unwrap();
        let v = transmute(a, &[0, 1, 2, 0]).unwrap();
        let m = materialize(&v).unwrap();
        assert_eq!(m.dims(), &[1, 2, 3, 1]);
        assert_eq!(m.data(), data.as_slice());
    }

    #[test]
    fn test_copy_into() {
        let a = StridedArray::<f64>::from_fn_col_major(&[3, 2], |idx| (idx[0] + 10 * idx[1]) as f64);
        let t = transmute(&a, &[2, 0, 1]).unwrap();
        let mut out = StridedArray::<f64>::row_major(&[2, 1, 3]);
        copy_into(&mut out, &t).unwrap();
        assert_eq!(out.get(&[1, 0, 2]).unwrap(), 12.0);
        assert_eq!(out.get(&[0, 0, 1]).unwrap(), 1.0);
    }

    #[test]
    fn test_copy_into_through_view() {
        let a = StridedArray::<i32>::from_fn_col_major(&[2, 3], |idx| (idx[0] * 3 + idx[1]) as i32);
        let mut out = StridedArray::<i32>::col_major(&[3, 2]);
        {
            // Writing through a transposed view of `out` lays `a` out transposed.
            let mut dest = transmute(&mut out, &[2, 1]).unwrap();
            copy_into(&mut dest, &a).unwrap();
        }
        assert_eq!(out.get(&[2, 1]).unwrap(), a.get(&[1, 2]).unwrap());
        assert_eq!(out.get(&[0, 1]).unwrap(), a.get(&[1, 0]).unwrap());
    }

    #[test]
    fn test_copy_into_shape_mismatch() {
        let a = StridedArray::<i32>::col_major(&[2, 3]);
        let mut out = StridedArray::<i32>::col_major(&[2, 3]);
        let t = transmute(&a, &[2, 1]).unwrap();
        assert_eq!(
            copy_into(&mut out, &t),
            Err(StridedError::ShapeMismatch(vec![2, 3], vec![3, 2]))
        );
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_par_materialize_matches_sequential() {
        let a = StridedArray::<u32>::from_fn_col_major(&[64, 32, 20], |idx| {
            (idx[0] * 10_000 + idx[1] * 100 + idx[2]) as u32
        });
        let v = transmute(&a, &[3, 0, 1, 2]).unwrap();
        assert!(v.len() >= crate::MINTHREADLENGTH);
        let seq = materialize(&v).unwrap();
        let par = par_materialize(&v).unwrap();
        assert_eq!(seq.dims(), par.dims());
        assert_eq!(seq.data(), par.data());
    }
}

//! Sorting coordinate tensors under a mode permutation
//!
//! Fiber construction requires the nonzeros in ascending lexicographic order
//! over `order[0], order[1], …`. Two ways to get there are provided:
//!
//! - [`sorted_permutation`] computes the nonzero order without touching the
//!   tensor, so several modes can be built from one shared tensor at once;
//! - [`sort_by_mode_order`] physically reorders the tensor's parallel arrays.
//!
//! Both sorts are stable: nonzeros with equal coordinates keep their input order.
//!
//! # Examples
//!
//! ```
//! use tenrso_fiber::coord::CoordTensor;
//! use tenrso_fiber::sort::{sort_by_mode_order, sorted_permutation};
//!
//! let mut tt = CoordTensor::from_entries(
//!     vec![2, 2, 2],
//!     [([1usize, 0, 0], 1.0), ([0, 1, 0], 2.0), ([0, 0, 1], 3.0)],
//! )
//! .unwrap();
//!
//! assert_eq!(sorted_permutation(&tt, &[0, 1, 2]).unwrap(), vec![2, 1, 0]);
//!
//! sort_by_mode_order(&mut tt, &[2, 1, 0]).unwrap();
//! assert_eq!(tt.vals(), &[1.0, 2.0, 3.0]);
//! ```

use std::cmp::Ordering;

use crate::coord::CoordTensor;
use crate::error::{try_alloc, SparseResult};
use crate::order::validate_mode_order;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Compares nonzeros `a` and `b` lexicographically over `order`.
#[inline]
pub fn compare_nonzeros<T>(tensor: &CoordTensor<T>, order: &[usize], a: usize, b: usize) -> Ordering {
    for &mode in order {
        let ind = tensor.ind(mode);
        match ind[a].cmp(&ind[b]) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Returns the nonzero permutation that sorts `tensor` under `order`.
///
/// Position `n` of the result holds the storage index of the `n`-th nonzero
/// in sorted order. The tensor is not modified.
///
/// # Complexity
///
/// O(nnz × log(nnz) × nmodes)
pub fn sorted_permutation<T>(tensor: &CoordTensor<T>, order: &[usize]) -> SparseResult<Vec<usize>> {
    validate_mode_order(order, tensor.nmodes())?;

    let mut perm = try_alloc("nonzero permutation", tensor.nnz())?;
    perm.extend(0..tensor.nnz());
    perm.sort_by(|&a, &b| compare_nonzeros(tensor, order, a, b));
    Ok(perm)
}

/// Parallel version of [`sorted_permutation`].
#[cfg(feature = "parallel")]
pub fn par_sorted_permutation<T: Sync>(
    tensor: &CoordTensor<T>,
    order: &[usize],
) -> SparseResult<Vec<usize>> {
    validate_mode_order(order, tensor.nmodes())?;

    let mut perm = try_alloc("nonzero permutation", tensor.nnz())?;
    perm.extend(0..tensor.nnz());
    perm.par_sort_by(|&a, &b| compare_nonzeros(tensor, order, a, b));
    Ok(perm)
}

/// Sorts the tensor in place under `order`.
///
/// Every index array and the values are permuted together.
pub fn sort_by_mode_order<T: Clone>(tensor: &mut CoordTensor<T>, order: &[usize]) -> SparseResult<()> {
    let perm = sorted_permutation(tensor, order)?;
    if perm.iter().enumerate().any(|(n, &p)| n != p) {
        tensor.permute(&perm)?;
    }
    Ok(())
}

/// Returns the first position at which the nonzeros, visited through `perm`
/// (or in storage order when `perm` is `None`), are not sorted under `order`.
pub fn first_unsorted<T>(tensor: &CoordTensor<T>, order: &[usize], perm: Option<&[usize]>) -> Option<usize> {
    let at = |n: usize| perm.map_or(n, |p| p[n]);
    (1..tensor.nnz()).find(|&n| compare_nonzeros(tensor, order, at(n - 1), at(n)) == Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CoordTensor<f64> {
        CoordTensor::from_entries(
            vec![3, 3, 3],
            [
                ([2usize, 0, 1], 1.0),
                ([0, 2, 0], 2.0),
                ([0, 1, 2], 3.0),
                ([1, 1, 1], 4.0),
                ([0, 1, 0], 5.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_sorted_permutation_natural_order() {
        let tt = sample();
        let perm = sorted_permutation(&tt, &[0, 1, 2]).unwrap();
        assert_eq!(perm, vec![4, 2, 1, 3, 0]);
        assert_eq!(first_unsorted(&tt, &[0, 1, 2], Some(&perm)), None);
    }

    #[test]
    fn test_sorted_permutation_leaves_tensor_alone() {
        let tt = sample();
        let before = tt.clone();
        let _ = sorted_permutation(&tt, &[2, 0, 1]).unwrap();
        assert_eq!(tt, before);
    }

    #[test]
    fn test_sort_in_place() {
        let mut tt = sample();
        sort_by_mode_order(&mut tt, &[2, 0, 1]).unwrap();

        assert_eq!(tt.ind(2), &[0, 0, 1, 1, 2]);
        assert_eq!(tt.ind(0), &[0, 0, 1, 2, 0]);
        assert_eq!(tt.vals(), &[5.0, 2.0, 4.0, 1.0, 3.0]);
        assert_eq!(first_unsorted(&tt, &[2, 0, 1], None), None);
    }

    #[test]
    fn test_sort_is_stable_for_duplicates() {
        let mut tt = CoordTensor::from_entries(
            vec![2, 2, 2],
            [([1usize, 1, 1], 1.0), ([0, 0, 0], 2.0), ([1, 1, 1], 3.0)],
        )
        .unwrap();
        sort_by_mode_order(&mut tt, &[0, 1, 2]).unwrap();
        assert_eq!(tt.vals(), &[2.0, 1.0, 3.0]);
    }

    #[test]
    fn test_first_unsorted() {
        let tt = sample();
        assert_eq!(first_unsorted(&tt, &[0, 1, 2], None), Some(1));
    }

    #[test]
    fn test_invalid_order_rejected() {
        let tt = sample();
        assert!(sorted_permutation(&tt, &[0, 1]).is_err());
        assert!(sorted_permutation(&tt, &[0, 1, 1]).is_err());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_par_sorted_permutation_matches_sequential() {
        let tt = sample();
        for order in [[0, 1, 2], [1, 2, 0], [2, 0, 1]] {
            assert_eq!(
                par_sorted_permutation(&tt, &order).unwrap(),
                sorted_permutation(&tt, &order).unwrap()
            );
        }
    }
}

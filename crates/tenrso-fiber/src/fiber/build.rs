//! Construction of one mode's fiber structure from sorted nonzeros
//!
//! The builder makes two passes over the sorted nonzeros:
//!
//! 1. copy innermost coordinates and values, and count fibers;
//! 2. fold over the fiber starts carrying `(next_slice, fibers)`, writing
//!    `fptr`/`fids` for every new fiber and carrying the fiber count forward
//!    through any empty slices in `sptr`.
//!
//! A nonzero starts a new fiber when its slice coordinate or its fiber-id
//! coordinate differs from its predecessor's. Only three-mode tensors have
//! exactly those two outer levels, so anything else is rejected.

use smallvec::SmallVec;

use super::mode::ModeFibers;
use crate::config::FiberConfig;
use crate::coord::{CoordTensor, TensorKind};
use crate::error::{try_alloc, try_filled, SparseError, SparseResult, ValidationError};
use crate::order::validate_mode_order;
use crate::sort::first_unsorted;

/// A coordinate tensor read in sorted order
///
/// Either the tensor itself is physically sorted, or a nonzero permutation
/// (see [`crate::sort::sorted_permutation`]) gives the order.
#[derive(Debug, Clone, Copy)]
pub struct SortedView<'a, T> {
    tensor: &'a CoordTensor<T>,
    perm: Option<&'a [usize]>,
}

impl<'a, T> SortedView<'a, T> {
    /// View a tensor whose storage order is already sorted
    pub fn in_place(tensor: &'a CoordTensor<T>) -> Self {
        Self { tensor, perm: None }
    }

    /// View a tensor through a nonzero permutation
    ///
    /// `perm` must hold every storage index `0..nnz` exactly once.
    pub fn permuted(tensor: &'a CoordTensor<T>, perm: &'a [usize]) -> SparseResult<Self> {
        let nnz = tensor.nnz();
        if perm.len() != nnz {
            return Err(SparseError::InvalidArgument(format!(
                "permutation has {} entries for {} nonzeros",
                perm.len(),
                nnz
            )));
        }

        let mut seen = try_filled("permutation check", nnz, false)?;
        for (n, &p) in perm.iter().enumerate() {
            if p >= nnz {
                return Err(SparseError::InvalidArgument(format!(
                    "permutation entry {} is {}, past {} nonzeros",
                    n, p, nnz
                )));
            }
            if std::mem::replace(&mut seen[p], true) {
                return Err(SparseError::InvalidArgument(format!(
                    "permutation repeats nonzero {} at entry {}",
                    p, n
                )));
            }
        }
        Ok(Self {
            tensor,
            perm: Some(perm),
        })
    }

    /// The underlying tensor
    #[inline]
    pub fn tensor(&self) -> &'a CoordTensor<T> {
        self.tensor
    }

    /// Number of nonzeros
    #[inline]
    pub fn nnz(&self) -> usize {
        self.tensor.nnz()
    }

    /// Storage index of the `n`-th nonzero in sorted order
    #[inline]
    fn at(&self, n: usize) -> usize {
        match self.perm {
            Some(perm) => perm[n],
            None => n,
        }
    }
}

/// Running state of the second pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FiberScan {
    /// First slice whose pointer has not been written yet
    next_slice: usize,
    /// Fibers opened so far
    fibers: usize,
}

impl FiberScan {
    /// Opens a fiber in `slice`.
    ///
    /// Every slice from `next_slice` through `slice` starts at the new fiber;
    /// the ones before `slice` are empty.
    fn open_fiber(self, slice: usize, sptr: &mut [usize]) -> Self {
        let next_slice = if slice >= self.next_slice {
            sptr[self.next_slice..=slice].fill(self.fibers);
            slice + 1
        } else {
            self.next_slice
        };
        Self {
            next_slice,
            fibers: self.fibers + 1,
        }
    }

    /// Writes the remaining slice pointers, including the terminal one.
    fn close(self, sptr: &mut [usize]) {
        sptr[self.next_slice..].fill(self.fibers);
    }
}

/// Builds the fiber structure of one mode.
///
/// `dim_perm[0]` is the mode being built; the nonzeros of `view` must be
/// sorted lexicographically over `dim_perm`.
///
/// # Errors
///
/// - [`SparseError::UnsupportedShape`] unless the tensor has exactly three modes
/// - [`ValidationError::InvalidModeOrder`] if `dim_perm` is not a permutation
/// - [`ValidationError::UnsortedIndices`] if `config.check_sorted` finds the
///   view out of order
/// - [`SparseError::Allocation`] if a buffer cannot be allocated
///
/// # Examples
///
/// ```
/// use tenrso_fiber::{build_mode, CoordTensor, FiberConfig, SortedView};
/// use tenrso_fiber::sort::sorted_permutation;
///
/// let tt = CoordTensor::from_entries(
///     vec![2, 2, 2],
///     [([1usize, 0, 0], 4.0), ([0, 0, 1], 2.0), ([0, 1, 0], 3.0), ([0, 0, 0], 1.0)],
/// )
/// .unwrap();
///
/// let order = [0, 1, 2];
/// let perm = sorted_permutation(&tt, &order).unwrap();
/// let mf = build_mode(SortedView::permuted(&tt, &perm).unwrap(), &order, &FiberConfig::default()).unwrap();
///
/// assert_eq!(mf.fptr(), &[0, 2, 3, 4]);
/// assert_eq!(mf.inds(), &[0, 1, 0, 0]);
/// assert_eq!(mf.vals(), &[1.0, 2.0, 3.0, 4.0]);
/// ```
pub fn build_mode<T: Copy>(
    view: SortedView<'_, T>,
    dim_perm: &[usize],
    config: &FiberConfig,
) -> SparseResult<ModeFibers<T>> {
    let tensor = view.tensor();
    let nmodes = tensor.nmodes();
    if tensor.kind() != TensorKind::ThreeMode {
        return Err(SparseError::unsupported_shape(nmodes));
    }
    validate_mode_order(dim_perm, nmodes)?;

    if config.check_sorted {
        if let Some(position) = first_unsorted(tensor, dim_perm, view.perm) {
            return Err(ValidationError::UnsortedIndices { position }.into());
        }
    }

    let nnz = view.nnz();
    let outer = tensor.ind(dim_perm[0]);
    let mid = tensor.ind(dim_perm[1]);
    let inner = tensor.ind(dim_perm[nmodes - 1]);
    let values = tensor.vals();

    let starts_fiber = |n: usize| {
        if n == 0 {
            return true;
        }
        let (prev, cur) = (view.at(n - 1), view.at(n));
        outer[prev] != outer[cur] || mid[prev] != mid[cur]
    };

    // First pass
    let mut inds = try_alloc("inds", nnz)?;
    inds.extend((0..nnz).map(|n| inner[view.at(n)]));
    let mut vals = try_alloc("vals", nnz)?;
    vals.extend((0..nnz).map(|n| values[view.at(n)]));
    let nfibs = (0..nnz).filter(|&n| starts_fiber(n)).count();

    // Second pass
    let nslices = tensor.dims()[dim_perm[0]];
    let mut sptr = try_filled("sptr", nslices + 1, 0)?;
    let mut fptr = try_filled("fptr", nfibs + 1, 0)?;
    let mut fids = try_filled("fids", nfibs, 0)?;

    let scan = (0..nnz)
        .filter(|&n| starts_fiber(n))
        .fold(FiberScan::default(), |scan, n| {
            let p = view.at(n);
            fptr[scan.fibers] = n;
            fids[scan.fibers] = mid[p];
            scan.open_fiber(outer[p], &mut sptr)
        });
    debug_assert_eq!(scan.fibers, nfibs);
    scan.close(&mut sptr);
    fptr[nfibs] = nnz;

    Ok(ModeFibers {
        dim_perm: SmallVec::from_slice(dim_perm),
        sptr,
        fptr,
        fids,
        inds,
        vals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::{sort_by_mode_order, sorted_permutation};

    fn build(tt: &CoordTensor<f64>, order: &[usize]) -> ModeFibers<f64> {
        let perm = sorted_permutation(tt, order).unwrap();
        build_mode(
            SortedView::permuted(tt, &perm).unwrap(),
            order,
            &FiberConfig::default().check_sorted(true),
        )
        .unwrap()
    }

    fn tiny() -> CoordTensor<f64> {
        CoordTensor::from_entries(
            vec![2, 2, 2],
            [
                ([0usize, 0, 0], 1.0),
                ([0, 0, 1], 2.0),
                ([0, 1, 0], 3.0),
                ([1, 0, 0], 4.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_scan_open_and_close() {
        let mut sptr = vec![usize::MAX; 5];
        let scan = FiberScan::default()
            .open_fiber(1, &mut sptr)
            .open_fiber(1, &mut sptr)
            .open_fiber(3, &mut sptr);
        assert_eq!(
            scan,
            FiberScan {
                next_slice: 4,
                fibers: 3
            }
        );
        scan.close(&mut sptr);
        assert_eq!(sptr, vec![0, 0, 2, 2, 3]);
    }

    #[test]
    fn test_tiny_identity_order() {
        let mf = build(&tiny(), &[0, 1, 2]);
        assert_eq!(mf.nfibs(), 3);
        assert_eq!(mf.sptr(), &[0, 2, 3]);
        assert_eq!(mf.fptr(), &[0, 2, 3, 4]);
        assert_eq!(mf.fids(), &[0, 1, 0]);
        assert_eq!(mf.inds(), &[0, 1, 0, 0]);
        assert_eq!(mf.vals(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_tiny_swapped_inner_order() {
        let mf = build(&tiny(), &[0, 2, 1]);
        assert_eq!(mf.fptr(), &[0, 2, 3, 4]);
        assert_eq!(mf.fids(), &[0, 1, 0]);
        assert_eq!(mf.inds(), &[0, 1, 0, 0]);
        assert_eq!(mf.vals(), &[1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn test_empty_slices_leading_middle_trailing() {
        // Slices 0, 2 and 4 of mode 0 hold nothing
        let tt = CoordTensor::from_entries(
            vec![5, 3, 3],
            [([1usize, 0, 2], 1.0), ([3, 2, 0], 2.0), ([3, 2, 1], 3.0), ([1, 1, 1], 4.0)],
        )
        .unwrap();
        let mf = build(&tt, &[0, 1, 2]);

        assert_eq!(mf.sptr(), &[0, 0, 2, 2, 3, 3]);
        assert_eq!(mf.fptr(), &[0, 1, 2, 4]);
        assert_eq!(mf.fids(), &[0, 1, 2]);
        assert_eq!(mf.empty_slices(), 3);
        mf.check_invariants(tt.dims(), tt.nnz()).unwrap();
    }

    #[test]
    fn test_empty_tensor() {
        let tt = CoordTensor::<f64>::zeros(vec![3, 2, 2]).unwrap();
        let mf = build(&tt, &[0, 1, 2]);
        assert_eq!(mf.nfibs(), 0);
        assert_eq!(mf.sptr(), &[0, 0, 0, 0]);
        assert_eq!(mf.fptr(), &[0]);
        assert!(mf.inds().is_empty());
        mf.check_invariants(tt.dims(), 0).unwrap();
    }

    #[test]
    fn test_duplicates_share_a_fiber() {
        let tt = CoordTensor::from_entries(
            vec![2, 2, 2],
            [([1usize, 1, 0], 1.0), ([1, 1, 0], 2.0)],
        )
        .unwrap();
        let mf = build(&tt, &[0, 1, 2]);
        assert_eq!(mf.nfibs(), 1);
        assert_eq!(mf.fptr(), &[0, 2]);
        assert_eq!(mf.inds(), &[0, 0]);
    }

    #[test]
    fn test_in_place_view_matches_permuted_view() {
        let mut tt = tiny();
        let order = [1, 0, 2];
        let expected = build(&tt, &order);

        sort_by_mode_order(&mut tt, &order).unwrap();
        let mf = build_mode(SortedView::in_place(&tt), &order, &FiberConfig::default()).unwrap();
        assert_eq!(mf, expected);
    }

    #[test]
    fn test_rejects_non_three_mode() {
        let tt = CoordTensor::from_entries(vec![2, 2, 2, 2], [([0usize, 1, 0, 1], 1.0)]).unwrap();
        let err = build_mode(SortedView::in_place(&tt), &[0, 1, 2, 3], &FiberConfig::default())
            .unwrap_err();
        assert!(matches!(err, SparseError::UnsupportedShape { nmodes: 4, .. }));

        let tt = CoordTensor::from_entries(vec![2, 2], [([0usize, 1], 1.0)]).unwrap();
        let err = build_mode(SortedView::in_place(&tt), &[0, 1], &FiberConfig::default()).unwrap_err();
        assert!(matches!(err, SparseError::UnsupportedShape { nmodes: 2, .. }));
    }

    #[test]
    fn test_rejects_unsorted_input() {
        let tt = CoordTensor::from_entries(
            vec![2, 2, 2],
            [([1usize, 0, 0], 1.0), ([0, 0, 0], 2.0)],
        )
        .unwrap();
        let config = FiberConfig::default().check_sorted(true);
        let err = build_mode(SortedView::in_place(&tt), &[0, 1, 2], &config).unwrap_err();
        assert!(matches!(
            err,
            SparseError::Validation(ValidationError::UnsortedIndices { position: 1 })
        ));
    }

    #[test]
    fn test_rejects_bad_permutation_length() {
        let tt = tiny();
        assert!(matches!(
            SortedView::permuted(&tt, &[0, 1]),
            Err(SparseError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_non_permutation() {
        let tt = tiny();
        for perm in [[0usize, 0, 0, 0], [0, 1, 2, 2], [0, 1, 2, 9]] {
            assert!(matches!(
                SortedView::permuted(&tt, &perm),
                Err(SparseError::InvalidArgument(_))
            ));
        }
        assert!(SortedView::permuted(&tt, &[3, 1, 0, 2]).is_ok());
    }
}

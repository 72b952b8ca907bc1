//! Per-mode storage of a fiber tensor

use std::ops::Range;

use crate::error::{SparseError, SparseResult};
use crate::order::{validate_mode_order, ModeOrder};

/// Three-level compressed structure for one mode of a fiber tensor
///
/// Levels, outermost first:
/// - `sptr`: for slice `s` along `dim_perm[0]`, fibers `sptr[s]..sptr[s+1]`
/// - `fptr`/`fids`: for fiber `f`, nonzeros `fptr[f]..fptr[f+1]`, and the
///   fiber's coordinate along `dim_perm[1]`
/// - `inds`/`vals`: innermost coordinate (along the last mode of `dim_perm`)
///   and value of every nonzero
#[derive(Debug, Clone, PartialEq)]
pub struct ModeFibers<T> {
    pub(crate) dim_perm: ModeOrder,
    pub(crate) sptr: Vec<usize>,
    pub(crate) fptr: Vec<usize>,
    pub(crate) fids: Vec<usize>,
    pub(crate) inds: Vec<usize>,
    pub(crate) vals: Vec<T>,
}

/// One fiber of a [`ModeFibers`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fiber<'a, T> {
    /// Coordinate along the slice mode
    pub slice: usize,
    /// Coordinate along the fiber-id mode
    pub id: usize,
    /// Innermost coordinates of the fiber's nonzeros
    pub inds: &'a [usize],
    /// Values of the fiber's nonzeros
    pub vals: &'a [T],
}

impl<T> ModeFibers<T> {
    /// The mode this structure was built for (the slice mode)
    #[inline]
    pub fn mode(&self) -> usize {
        self.dim_perm[0]
    }

    /// Mode permutation used to build this structure
    #[inline]
    pub fn dim_perm(&self) -> &[usize] {
        &self.dim_perm
    }

    /// Mode whose coordinate identifies each fiber
    #[inline]
    pub fn fiber_id_mode(&self) -> usize {
        self.dim_perm[1]
    }

    /// Innermost mode, the one that varies along a fiber
    #[inline]
    pub fn inner_mode(&self) -> usize {
        self.dim_perm[self.dim_perm.len() - 1]
    }

    /// Number of slices (size of the slice mode)
    #[inline]
    pub fn nslices(&self) -> usize {
        self.sptr.len() - 1
    }

    /// Number of fibers
    #[inline]
    pub fn nfibs(&self) -> usize {
        self.fids.len()
    }

    /// Number of nonzeros
    #[inline]
    pub fn nnz(&self) -> usize {
        self.vals.len()
    }

    /// Slice pointers (length nslices + 1)
    #[inline]
    pub fn sptr(&self) -> &[usize] {
        &self.sptr
    }

    /// Fiber pointers (length nfibs + 1)
    #[inline]
    pub fn fptr(&self) -> &[usize] {
        &self.fptr
    }

    /// Fiber ids (length nfibs)
    #[inline]
    pub fn fids(&self) -> &[usize] {
        &self.fids
    }

    /// Innermost coordinates (length nnz)
    #[inline]
    pub fn inds(&self) -> &[usize] {
        &self.inds
    }

    /// Values (length nnz)
    #[inline]
    pub fn vals(&self) -> &[T] {
        &self.vals
    }

    /// Range of fibers belonging to slice `s`; empty for empty slices.
    pub fn slice_fibers(&self, s: usize) -> Option<Range<usize>> {
        if s >= self.nslices() {
            return None;
        }
        Some(self.sptr[s]..self.sptr[s + 1])
    }

    /// Innermost coordinates and values of fiber `f`
    pub fn fiber(&self, f: usize) -> Option<(&[usize], &[T])> {
        if f >= self.nfibs() {
            return None;
        }
        let range = self.fptr[f]..self.fptr[f + 1];
        Some((&self.inds[range.clone()], &self.vals[range]))
    }

    /// Iterate over all fibers in slice order
    pub fn fibers(&self) -> FiberIter<'_, T> {
        FiberIter {
            fibers: self,
            slice: 0,
            fiber: 0,
        }
    }

    /// Number of slices holding no nonzeros
    pub fn empty_slices(&self) -> usize {
        self.sptr.windows(2).filter(|w| w[0] == w[1]).count()
    }

    /// Approximate heap footprint in bytes
    pub fn storage_bytes(&self) -> usize {
        let idx = std::mem::size_of::<usize>();
        (self.sptr.len() + self.fptr.len() + self.fids.len() + self.inds.len()) * idx
            + self.vals.len() * std::mem::size_of::<T>()
    }

    /// Checks the structural invariants against the source tensor's shape.
    ///
    /// - `sptr` has `dims[mode] + 1` entries, starts at 0, ends at `nfibs`, never decreases
    /// - `fptr` has `nfibs + 1` entries, starts at 0, ends at `nnz`, never decreases
    /// - `inds` and `vals` hold `nnz` entries
    /// - fiber ids and innermost coordinates are within their modes' dimensions
    pub fn check_invariants(&self, dims: &[usize], nnz: usize) -> SparseResult<()> {
        validate_mode_order(&self.dim_perm, dims.len())?;

        let nslices = dims[self.mode()];
        check_pointers("sptr", &self.sptr, nslices + 1, self.nfibs())?;
        check_pointers("fptr", &self.fptr, self.nfibs() + 1, nnz)?;

        if self.inds.len() != nnz || self.vals.len() != nnz {
            return Err(SparseError::invalid_pointers(format!(
                "inds/vals hold {}/{} entries, expected {}",
                self.inds.len(),
                self.vals.len(),
                nnz
            )));
        }

        let id_dim = dims[self.fiber_id_mode()];
        if let Some(f) = self.fids.iter().position(|&id| id >= id_dim) {
            return Err(SparseError::invalid_pointers(format!(
                "fiber {} has id {} >= {}",
                f, self.fids[f], id_dim
            )));
        }

        let inner_dim = dims[self.inner_mode()];
        if let Some(n) = self.inds.iter().position(|&i| i >= inner_dim) {
            return Err(SparseError::invalid_pointers(format!(
                "nonzero {} has inner index {} >= {}",
                n, self.inds[n], inner_dim
            )));
        }

        Ok(())
    }
}

fn check_pointers(name: &str, ptr: &[usize], len: usize, last: usize) -> SparseResult<()> {
    if ptr.len() != len {
        return Err(SparseError::invalid_pointers(format!(
            "{} has length {}, expected {}",
            name,
            ptr.len(),
            len
        )));
    }
    if ptr[0] != 0 || ptr[len - 1] != last {
        return Err(SparseError::invalid_pointers(format!(
            "{} spans {}..{}, expected 0..{}",
            name,
            ptr[0],
            ptr[len - 1],
            last
        )));
    }
    if let Some(i) = ptr.windows(2).position(|w| w[0] > w[1]) {
        return Err(SparseError::invalid_pointers(format!(
            "{} decreases at {}: {} > {}",
            name,
            i,
            ptr[i],
            ptr[i + 1]
        )));
    }
    Ok(())
}

/// Iterator over the fibers of a [`ModeFibers`]
pub struct FiberIter<'a, T> {
    fibers: &'a ModeFibers<T>,
    slice: usize,
    fiber: usize,
}

impl<'a, T> Iterator for FiberIter<'a, T> {
    type Item = Fiber<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let fibers = self.fibers;
        if self.fiber >= fibers.nfibs() {
            return None;
        }

        // Skip slices that end before this fiber, empty ones included
        while fibers.sptr[self.slice + 1] <= self.fiber {
            self.slice += 1;
        }

        let f = self.fiber;
        self.fiber += 1;
        let range = fibers.fptr[f]..fibers.fptr[f + 1];

        Some(Fiber {
            slice: self.slice,
            id: fibers.fids[f],
            inds: &fibers.inds[range.clone()],
            vals: &fibers.vals[range],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.fibers.nfibs() - self.fiber;
        (left, Some(left))
    }
}

impl<'a, T> ExactSizeIterator for FiberIter<'a, T> {}

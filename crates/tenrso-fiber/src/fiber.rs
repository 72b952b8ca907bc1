//! Fiber tensors: one compressed fiber structure per mode
//!
//! # Overview
//!
//! A fiber tensor stores a three-mode sparse tensor once per mode. The copy
//! for mode `m` is sorted under its own mode permutation (see
//! [`crate::order`]) and compressed into three levels:
//!
//! - slices along `m` (`sptr`),
//! - fibers along the permutation's second mode (`fptr`, `fids`),
//! - nonzeros along the innermost mode (`inds`, `vals`).
//!
//! # Example
//!
//! For nonzeros (0,0,0)=1, (0,0,1)=2, (0,1,0)=3, (1,0,0)=4 built for mode 0
//! under the order [0, 1, 2]:
//! - `sptr = [0, 2, 3]`      // slice 0 owns fibers 0..2, slice 1 owns fiber 2
//! - `fptr = [0, 2, 3, 4]`   // fiber f owns nonzeros fptr[f]..fptr[f+1]
//! - `fids = [0, 1, 0]`      // mode-1 coordinate of each fiber
//! - `inds = [0, 1, 0, 0]`   // mode-2 coordinate of each nonzero
//! - `vals = [1, 2, 3, 4]`
//!
//! # Complexity
//!
//! - **Construction**: O(nmodes × nnz × log(nnz)) for sorting + O(nmodes × nnz) for the scans
//! - **Memory**: O(nmodes × (nnz + nfibs + max dim))
//!
//! # Concurrency
//!
//! Modes are independent. The default path sorts through nonzero
//! permutations, leaving the input untouched, so with the `parallel` feature
//! the modes are built concurrently. [`FiberTensor::from_coord_in_place`]
//! instead sorts the caller's tensor mode by mode and is sequential.

mod build;
mod mode;

pub use build::{build_mode, SortedView};
pub use mode::{Fiber, FiberIter, ModeFibers};

use num_traits::Float;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::FiberConfig;
use crate::coord::{CoordTensor, TensorKind};
use crate::csr::CsrMatrix;
use crate::error::{try_alloc, try_copy, IndexError, SparseError, SparseResult, ValidationError};
use crate::order::{plan_mode_orders, validate_mode_order};
use crate::sort::{sort_by_mode_order, sorted_permutation};
use crate::tracing_support::{record_mode_build, record_rejection, record_tensor_build};

/// Fiber tensor holding an independent compressed structure for every mode
///
/// # Examples
///
/// ```
/// use tenrso_fiber::{CoordTensor, FiberTensor};
///
/// let tt = CoordTensor::from_entries(
///     vec![3, 100, 5],
///     [([0usize, 10, 1], 1.0), ([0, 20, 1], 2.0), ([2, 10, 4], 3.0)],
/// )
/// .unwrap();
///
/// let ft = FiberTensor::from_coord(&tt).unwrap();
/// assert_eq!(ft.nmodes(), 3);
///
/// // Mode 1 (size 100) is innermost when building mode 0
/// let m0 = ft.mode(0).unwrap();
/// assert_eq!(m0.dim_perm(), &[0, 2, 1]);
/// assert_eq!(m0.nfibs(), 2);
/// assert_eq!(m0.sptr(), &[0, 1, 1, 2]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FiberTensor<T> {
    /// Size of each mode
    dims: Vec<usize>,
    /// Number of nonzeros
    nnz: usize,
    /// One structure per mode, indexed by mode
    modes: Vec<ModeFibers<T>>,
}

impl<T: Float + Send + Sync> FiberTensor<T> {
    /// Builds every mode with the default [`FiberConfig`].
    pub fn from_coord(tensor: &CoordTensor<T>) -> SparseResult<Self> {
        Self::with_config(tensor, &FiberConfig::default())
    }

    /// Builds every mode under the planned mode orders.
    ///
    /// The input tensor is not modified.
    ///
    /// # Errors
    ///
    /// - [`SparseError::UnsupportedShape`] unless the tensor has exactly three modes
    /// - [`SparseError::Allocation`] if any buffer cannot be allocated
    /// - [`SparseError::Validation`] if a requested check fails
    pub fn with_config(tensor: &CoordTensor<T>, config: &FiberConfig) -> SparseResult<Self> {
        let orders = plan_mode_orders(tensor.dims());
        Self::with_mode_orders(tensor, &orders, config)
    }

    /// Builds every mode under caller-supplied mode orders.
    ///
    /// `orders[m]` must be a permutation of the modes starting with `m`.
    ///
    /// ```
    /// use tenrso_fiber::{CoordTensor, FiberConfig, FiberTensor};
    ///
    /// let tt = CoordTensor::from_entries(vec![2, 2, 2], [([0usize, 0, 1], 1.0)]).unwrap();
    /// let orders = [[0usize, 1, 2], [1, 0, 2], [2, 0, 1]];
    /// let ft = FiberTensor::with_mode_orders(&tt, &orders, &FiberConfig::default()).unwrap();
    /// assert_eq!(ft.mode(1).unwrap().dim_perm(), &[1, 0, 2]);
    /// ```
    pub fn with_mode_orders<O>(
        tensor: &CoordTensor<T>,
        orders: &[O],
        config: &FiberConfig,
    ) -> SparseResult<Self>
    where
        O: AsRef<[usize]> + Sync,
    {
        let result = Self::check_orders(tensor, orders).and_then(|()| {
            let parallel = config.use_parallel(tensor.nnz());
            let modes = collect_modes(orders, parallel, |mode, order| {
                let perm = nonzero_order(tensor, order.as_ref(), parallel)?;
                let view = SortedView::permuted(tensor, &perm)?;
                finish_mode(tensor, mode, build_mode(view, order.as_ref(), config)?, config)
            })?;
            Ok(Self::assemble(tensor, modes, parallel))
        });
        if let Err(err) = &result {
            record_rejection(err);
        }
        result
    }

    /// Builds every mode by sorting `tensor` in place before each mode.
    ///
    /// The exclusive borrow guarantees one mode's sorted view is checked out
    /// at a time. Afterwards the tensor is left sorted under the last mode's
    /// order; its original nonzero order is not restored.
    pub fn from_coord_in_place(
        tensor: &mut CoordTensor<T>,
        config: &FiberConfig,
    ) -> SparseResult<Self> {
        let orders = plan_mode_orders(tensor.dims());
        let result = Self::check_orders(tensor, &orders).and_then(|()| {
            let mut modes = try_alloc("modes", orders.len())?;
            for (mode, order) in orders.iter().enumerate() {
                sort_by_mode_order(tensor, order)?;
                let fibers = build_mode(SortedView::in_place(tensor), order, config)?;
                modes.push(finish_mode(tensor, mode, fibers, config)?);
            }
            Ok(Self::assemble(tensor, modes, false))
        });
        if let Err(err) = &result {
            record_rejection(err);
        }
        result
    }

    fn check_orders<O: AsRef<[usize]>>(tensor: &CoordTensor<T>, orders: &[O]) -> SparseResult<()> {
        let nmodes = tensor.nmodes();
        if tensor.kind() != TensorKind::ThreeMode {
            return Err(SparseError::unsupported_shape(nmodes));
        }
        if orders.len() != nmodes {
            return Err(SparseError::InvalidArgument(format!(
                "{} mode orders for {} modes",
                orders.len(),
                nmodes
            )));
        }
        for (mode, order) in orders.iter().enumerate() {
            let order = order.as_ref();
            validate_mode_order(order, nmodes)?;
            if order[0] != mode {
                return Err(ValidationError::InvalidModeOrder {
                    reason: format!("order {:?} for mode {} must start with {}", order, mode, mode),
                }
                .into());
            }
        }
        Ok(())
    }

    fn assemble(tensor: &CoordTensor<T>, modes: Vec<ModeFibers<T>>, parallel: bool) -> Self {
        let ft = Self {
            dims: tensor.dims().to_vec(),
            nnz: tensor.nnz(),
            modes,
        };
        record_tensor_build(ft.nmodes(), ft.nnz, ft.storage_bytes(), parallel);
        ft
    }
}

impl<T> FiberTensor<T> {
    /// Number of modes
    #[inline]
    pub fn nmodes(&self) -> usize {
        self.dims.len()
    }

    /// Size of each mode
    #[inline]
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of nonzeros
    #[inline]
    pub fn nnz(&self) -> usize {
        self.nnz
    }

    /// The structure built for `mode`
    pub fn mode(&self, mode: usize) -> SparseResult<&ModeFibers<T>> {
        self.modes.get(mode).ok_or_else(|| {
            IndexError::ModeOutOfRange {
                mode,
                nmodes: self.nmodes(),
            }
            .into()
        })
    }

    /// All per-mode structures, indexed by mode
    #[inline]
    pub fn modes(&self) -> &[ModeFibers<T>] {
        &self.modes
    }

    /// Approximate heap footprint of all modes in bytes
    pub fn storage_bytes(&self) -> usize {
        self.modes.iter().map(ModeFibers::storage_bytes).sum()
    }
}

impl<T: Clone> FiberTensor<T> {
    /// Copies one mode into an independent CSR matrix.
    ///
    /// Rows are the mode's fibers and columns the innermost mode's
    /// coordinates: `row_ptr`, `col_indices` and `values` are copies of
    /// `fptr`, `inds` and `vals`.
    ///
    /// # Errors
    ///
    /// [`SparseError::InvalidArgument`] if `mode >= nmodes()`.
    ///
    /// ```
    /// use tenrso_fiber::{CoordTensor, FiberTensor};
    ///
    /// let tt = CoordTensor::from_entries(vec![2, 3, 4], [([0usize, 1, 2], 5.0), ([0, 1, 3], 6.0)]).unwrap();
    /// let ft = FiberTensor::from_coord(&tt).unwrap();
    ///
    /// let csr = ft.to_csr(0).unwrap();
    /// assert_eq!(csr.shape(), (1, 4));
    /// assert_eq!(csr.row(0).unwrap(), (&[2, 3][..], &[5.0, 6.0][..]));
    /// ```
    pub fn to_csr(&self, mode: usize) -> SparseResult<CsrMatrix<T>> {
        let fibers = self.modes.get(mode).ok_or_else(|| {
            SparseError::InvalidArgument(format!(
                "mode {} out of range for tensor with {} modes",
                mode,
                self.nmodes()
            ))
        })?;

        let shape = (fibers.nfibs(), self.dims[fibers.inner_mode()]);
        let csr = CsrMatrix::new(
            try_copy("row_ptr", fibers.fptr())?,
            try_copy("col_indices", fibers.inds())?,
            try_copy("values", fibers.vals())?,
            shape,
        )?;
        Ok(csr)
    }
}

fn finish_mode<T>(
    tensor: &CoordTensor<T>,
    mode: usize,
    fibers: ModeFibers<T>,
    config: &FiberConfig,
) -> SparseResult<ModeFibers<T>> {
    if config.validate_structure {
        fibers.check_invariants(tensor.dims(), tensor.nnz())?;
    }
    record_mode_build(mode, fibers.nnz(), fibers.nfibs(), fibers.empty_slices());
    Ok(fibers)
}

#[cfg(feature = "parallel")]
fn nonzero_order<T: Sync>(
    tensor: &CoordTensor<T>,
    order: &[usize],
    parallel: bool,
) -> SparseResult<Vec<usize>> {
    if parallel {
        crate::sort::par_sorted_permutation(tensor, order)
    } else {
        sorted_permutation(tensor, order)
    }
}

#[cfg(not(feature = "parallel"))]
fn nonzero_order<T>(
    tensor: &CoordTensor<T>,
    order: &[usize],
    _parallel: bool,
) -> SparseResult<Vec<usize>> {
    sorted_permutation(tensor, order)
}

#[cfg(feature = "parallel")]
fn collect_modes<O, T, F>(orders: &[O], parallel: bool, build: F) -> SparseResult<Vec<ModeFibers<T>>>
where
    O: Sync,
    T: Send,
    F: Fn(usize, &O) -> SparseResult<ModeFibers<T>> + Sync + Send,
{
    if parallel {
        orders
            .par_iter()
            .enumerate()
            .map(|(mode, order)| build(mode, order))
            .collect()
    } else {
        orders
            .iter()
            .enumerate()
            .map(|(mode, order)| build(mode, order))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn collect_modes<O, T, F>(orders: &[O], _parallel: bool, build: F) -> SparseResult<Vec<ModeFibers<T>>>
where
    F: Fn(usize, &O) -> SparseResult<ModeFibers<T>>,
{
    orders
        .iter()
        .enumerate()
        .map(|(mode, order)| build(mode, order))
        .collect()
}

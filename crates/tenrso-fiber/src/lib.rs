//! # tenrso-fiber
//!
//! Mode-specific fiber tensors for TenRSo.
//!
//! This crate provides:
//! - Coordinate (COO) storage for sparse tensors
//! - Mode-order planning that puts the longest remaining mode innermost
//! - Per-mode three-level compressed fiber structures (slices, fibers, nonzeros)
//! - A CSR matrix view of any mode
//! - Parallel construction of independent modes (`parallel` feature)
//!
//! # Example
//!
//! ```
//! use tenrso_fiber::{CoordTensor, FiberTensor};
//!
//! let tt = CoordTensor::from_entries(
//!     vec![4, 3, 6],
//!     [([0usize, 1, 2], 1.0), ([0, 1, 5], 2.0), ([3, 0, 0], 3.0)],
//! )
//! .unwrap();
//!
//! let ft = FiberTensor::from_coord(&tt).unwrap();
//! for fibers in ft.modes() {
//!     assert_eq!(fibers.nnz(), 3);
//!     assert_eq!(fibers.sptr().len(), tt.dims()[fibers.mode()] + 1);
//! }
//!
//! let csr = ft.to_csr(0).unwrap();
//! assert_eq!(csr.shape(), (2, 6));
//! ```

#![deny(warnings)]

pub mod config;
pub mod coord;
pub mod csr;
pub mod error;
pub mod fiber;
pub mod order;
pub mod sort;
pub mod tracing_support;

// Re-exports
pub use config::FiberConfig;
pub use coord::{CoordError, CoordTensor, Coords, TensorKind, MAX_NMODES};
pub use csr::{CsrError, CsrMatrix};
pub use error::{IndexError, SparseError, SparseResult, ValidationError};
pub use fiber::{build_mode, Fiber, FiberIter, FiberTensor, ModeFibers, SortedView};
pub use order::{mode_order_for, plan_mode_orders, validate_mode_order, ModeOrder};
pub use sort::{first_unsorted, sort_by_mode_order, sorted_permutation};
pub use tracing_support::{init_tracing, TracingConfig, TracingFormat};

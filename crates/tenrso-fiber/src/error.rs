//! Unified error types for fiber tensor construction
//!
//! This module provides a centralized error handling system for the coordinate
//! tensor, the fiber builder and the CSR matrix view.
//!
//! # Design
//!
//! - **`SparseError`**: Top-level enum covering all error cases
//! - **Format-specific errors**: [`CoordError`](crate::coord::CoordError),
//!   [`CsrError`](crate::csr::CsrError)
//! - **Structural errors**: [`ValidationError`], [`IndexError`]
//!
//! `UnsupportedShape` and `Allocation` are fatal for the construction that
//! raised them: no partially built [`FiberTensor`](crate::FiberTensor) is
//! ever handed back.
//!
//! # Examples
//!
//! ```
//! use tenrso_fiber::error::{SparseError, ValidationError};
//!
//! fn require_order(order: &[usize]) -> Result<(), SparseError> {
//!     if order.is_empty() {
//!         return Err(SparseError::Validation(ValidationError::InvalidModeOrder {
//!             reason: "empty mode order".to_string(),
//!         }));
//!     }
//!     Ok(())
//! }
//!
//! assert!(require_order(&[]).is_err());
//! ```

use thiserror::Error;

/// Top-level error type for all fiber tensor operations
#[derive(Error, Debug)]
pub enum SparseError {
    /// Validation errors (mode orders, pointer arrays, sortedness)
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Index errors
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// Coordinate tensor errors
    #[error("Coordinate tensor error: {0}")]
    Coord(#[from] crate::coord::CoordError),

    /// CSR format errors
    #[error("CSR error: {0}")]
    Csr(#[from] crate::csr::CsrError),

    /// The builder only models three-mode tensors
    #[error("Unsupported tensor shape ({nmodes} modes): {reason}")]
    UnsupportedShape { nmodes: usize, reason: String },

    /// A buffer could not be allocated
    #[error("Allocation of {len} elements for {what} failed")]
    Allocation { what: &'static str, len: usize },

    /// Caller-side precondition violated
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Validation errors for structural properties
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid mode order: {reason}")]
    InvalidModeOrder { reason: String },

    #[error("Invalid pointer array: {reason}")]
    InvalidPointers { reason: String },

    #[error("Unsorted indices at position {position}")]
    UnsortedIndices { position: usize },
}

/// Index errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("Mode {mode} out of range for tensor with {nmodes} modes")]
    ModeOutOfRange { mode: usize, nmodes: usize },
}

/// Result type alias for fiber tensor operations
pub type SparseResult<T> = Result<T, SparseError>;

impl SparseError {
    /// Create an unsupported-shape error for a tensor with `nmodes` modes
    pub fn unsupported_shape(nmodes: usize) -> Self {
        SparseError::UnsupportedShape {
            nmodes,
            reason: "fiber tensors are only implemented for three-mode tensors".to_string(),
        }
    }

    /// Create a pointer-array validation error with a message
    pub fn invalid_pointers(reason: impl Into<String>) -> Self {
        SparseError::Validation(ValidationError::InvalidPointers {
            reason: reason.into(),
        })
    }
}

/// Allocates an empty vector with room for exactly `len` elements.
///
/// Reports failure as [`SparseError::Allocation`] instead of aborting.
pub(crate) fn try_alloc<T>(what: &'static str, len: usize) -> SparseResult<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| SparseError::Allocation { what, len })?;
    Ok(buf)
}

/// Allocates a vector of `len` copies of `fill`.
pub(crate) fn try_filled<T: Clone>(what: &'static str, len: usize, fill: T) -> SparseResult<Vec<T>> {
    let mut buf = try_alloc(what, len)?;
    buf.resize(len, fill);
    Ok(buf)
}

/// Copies `src` into a freshly allocated vector.
pub(crate) fn try_copy<T: Clone>(what: &'static str, src: &[T]) -> SparseResult<Vec<T>> {
    let mut buf = try_alloc(what, src.len())?;
    buf.extend_from_slice(src);
    Ok(buf)
}

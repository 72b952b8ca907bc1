//! Coordinate-format sparse tensor
//!
//! The coordinate tensor is the input to fiber tensor construction: an
//! unordered list of nonzeros stored as parallel arrays.
//!
//! # Format
//!
//! For an N-mode sparse tensor with `nnz` nonzeros:
//! - `dims`: `Vec<usize>` - size of each mode
//! - `ind`: `Vec<Vec<usize>>` - `ind[mode][n]` is the coordinate of nonzero `n` along `mode`
//! - `vals`: `Vec<T>` - the nonzero values, aligned with `ind`
//!
//! Every mode's index array shares the same nonzero ordering. Sorting
//! (see [`crate::sort`]) permutes all of them together.
//!
//! # Examples
//!
//! ```
//! use tenrso_fiber::coord::CoordTensor;
//!
//! let mut tt = CoordTensor::<f64>::zeros(vec![2, 3, 4]).unwrap();
//! tt.push(&[0, 1, 2], 2.5).unwrap();
//! tt.push(&[1, 2, 3], 3.0).unwrap();
//!
//! assert_eq!(tt.nnz(), 2);
//! assert_eq!(tt.ind(1), &[1, 2]);
//! ```

use smallvec::SmallVec;
use thiserror::Error;

use crate::error::{try_alloc, SparseResult};

/// Largest tensor order accepted anywhere in the crate
pub const MAX_NMODES: usize = 8;

/// Multi-index of a single nonzero
pub type Coords = SmallVec<[usize; MAX_NMODES]>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordError {
    #[error("Maximum {max} modes supported, found {nmodes}")]
    TooManyModes { nmodes: usize, max: usize },

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Mode count mismatch: shape has {expected} modes, got {got}")]
    ModeCountMismatch { expected: usize, got: usize },

    #[error("Length mismatch: mode {mode} has {indices} indices but there are {values} values")]
    LengthMismatch {
        mode: usize,
        indices: usize,
        values: usize,
    },

    #[error("Index out of bounds: coordinate {index} along mode {mode} exceeds dimension {dim}")]
    IndexOutOfBounds { mode: usize, index: usize, dim: usize },
}

/// Whether the fiber builder can handle a tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorKind {
    /// Exactly three modes
    ThreeMode,
    /// Any other number of modes
    NMode,
}

/// Coordinate-format sparse tensor stored as parallel arrays
#[derive(Debug, Clone, PartialEq)]
pub struct CoordTensor<T> {
    /// Size of each mode
    dims: Vec<usize>,

    /// Per-mode coordinate arrays, each of length nnz
    ind: Vec<Vec<usize>>,

    /// Nonzero values
    vals: Vec<T>,
}

fn check_dims(dims: &[usize]) -> Result<(), CoordError> {
    if dims.is_empty() {
        return Err(CoordError::InvalidShape("Shape cannot be empty".to_string()));
    }
    if dims.len() > MAX_NMODES {
        return Err(CoordError::TooManyModes {
            nmodes: dims.len(),
            max: MAX_NMODES,
        });
    }
    if dims.contains(&0) {
        return Err(CoordError::InvalidShape(
            "Shape cannot contain zeros".to_string(),
        ));
    }
    Ok(())
}

impl<T: Clone> CoordTensor<T> {
    /// Create a coordinate tensor from per-mode index arrays
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The shape is empty, contains zeros or has more than [`MAX_NMODES`] modes
    /// - The number of index arrays differs from the number of modes
    /// - Any index array differs in length from `vals`
    /// - Any coordinate is out of bounds
    pub fn new(dims: Vec<usize>, ind: Vec<Vec<usize>>, vals: Vec<T>) -> Result<Self, CoordError> {
        check_dims(&dims)?;

        if ind.len() != dims.len() {
            return Err(CoordError::ModeCountMismatch {
                expected: dims.len(),
                got: ind.len(),
            });
        }

        for (mode, (idx, &dim)) in ind.iter().zip(&dims).enumerate() {
            if idx.len() != vals.len() {
                return Err(CoordError::LengthMismatch {
                    mode,
                    indices: idx.len(),
                    values: vals.len(),
                });
            }
            if let Some(&index) = idx.iter().find(|&&i| i >= dim) {
                return Err(CoordError::IndexOutOfBounds { mode, index, dim });
            }
        }

        Ok(Self { dims, ind, vals })
    }

    /// Create an empty coordinate tensor with the given shape
    pub fn zeros(dims: Vec<usize>) -> Result<Self, CoordError> {
        check_dims(&dims)?;
        let ind = vec![Vec::new(); dims.len()];
        Ok(Self {
            dims,
            ind,
            vals: Vec::new(),
        })
    }

    /// Create a coordinate tensor from `(coords, value)` entries
    ///
    /// ```
    /// use tenrso_fiber::coord::CoordTensor;
    ///
    /// let tt = CoordTensor::from_entries(
    ///     vec![2, 2, 2],
    ///     [([0usize, 0, 1], 1.0), ([1, 1, 0], 2.0)],
    /// )
    /// .unwrap();
    /// assert_eq!(tt.nnz(), 2);
    /// ```
    pub fn from_entries<I, C>(dims: Vec<usize>, entries: I) -> Result<Self, CoordError>
    where
        I: IntoIterator<Item = (C, T)>,
        C: AsRef<[usize]>,
    {
        let mut tt = Self::zeros(dims)?;
        for (coords, value) in entries {
            tt.push(coords.as_ref(), value)?;
        }
        Ok(tt)
    }

    /// Append a nonzero
    ///
    /// Duplicates are not merged; they land in the same fiber after construction.
    pub fn push(&mut self, coords: &[usize], value: T) -> Result<(), CoordError> {
        if coords.len() != self.dims.len() {
            return Err(CoordError::ModeCountMismatch {
                expected: self.dims.len(),
                got: coords.len(),
            });
        }
        for (mode, (&index, &dim)) in coords.iter().zip(&self.dims).enumerate() {
            if index >= dim {
                return Err(CoordError::IndexOutOfBounds { mode, index, dim });
            }
        }

        for (idx, &index) in self.ind.iter_mut().zip(coords) {
            idx.push(index);
        }
        self.vals.push(value);
        Ok(())
    }

    /// Apply a nonzero permutation: position `n` receives old nonzero `perm[n]`.
    ///
    /// Every gathered array is allocated before the tensor is touched, so a
    /// failed allocation leaves it unchanged.
    pub(crate) fn permute(&mut self, perm: &[usize]) -> SparseResult<()> {
        debug_assert_eq!(perm.len(), self.nnz());

        let mut ind = try_alloc("permuted indices", self.ind.len())?;
        for idx in &self.ind {
            let mut permuted = try_alloc("permuted indices", perm.len())?;
            permuted.extend(perm.iter().map(|&p| idx[p]));
            ind.push(permuted);
        }
        let mut vals = try_alloc("permuted values", perm.len())?;
        vals.extend(perm.iter().map(|&p| self.vals[p].clone()));

        self.ind = ind;
        self.vals = vals;
        Ok(())
    }
}

impl<T> CoordTensor<T> {
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
        self.vals.len()
    }

    /// Coordinates of every nonzero along `mode`
    ///
    /// # Panics
    ///
    /// Panics if `mode >= nmodes()`.
    #[inline]
    pub fn ind(&self, mode: usize) -> &[usize] {
        &self.ind[mode]
    }

    /// Nonzero values
    #[inline]
    pub fn vals(&self) -> &[T] {
        &self.vals
    }

    /// Multi-index of nonzero `n`
    pub fn coords(&self, n: usize) -> Coords {
        self.ind.iter().map(|idx| idx[n]).collect()
    }

    /// Iterate over `(coords, &value)` in storage order
    pub fn entries(&self) -> impl Iterator<Item = (Coords, &T)> + '_ {
        self.vals.iter().enumerate().map(|(n, v)| (self.coords(n), v))
    }

    /// Classify the tensor for the fiber builder
    pub fn kind(&self) -> TensorKind {
        if self.nmodes() == 3 {
            TensorKind::ThreeMode
        } else {
            TensorKind::NMode
        }
    }

    /// Compute density (nnz / total elements)
    pub fn density(&self) -> f64 {
        let total: f64 = self.dims.iter().map(|&d| d as f64).product();
        self.nnz() as f64 / total
    }
}

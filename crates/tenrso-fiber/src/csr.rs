//! CSR (Compressed Sparse Row) matrix view of one fiber tensor mode
//!
//! Each fiber of a mode becomes a row and the innermost mode becomes the
//! column axis, so a fiber tensor mode can be fed to ordinary sparse-matrix
//! kernels.
//!
//! # Format
//!
//! For an m×n sparse matrix with nnz non-zeros:
//! - `row_ptr`: `Vec<usize>` of length m+1 - row_ptr\[i\] points to start of row i
//! - `col_indices`: `Vec<usize>` of length nnz - column index for each non-zero
//! - `values`: `Vec<T>` of length nnz - the non-zero values
//! - `shape`: (m, n) - dimensions of the matrix
//!
//! # Examples
//!
//! ```
//! use tenrso_fiber::csr::CsrMatrix;
//!
//! // [1.0  0   2.0]
//! // [0    3.0 0  ]
//! let csr = CsrMatrix::new(vec![0, 2, 3], vec![0, 2, 1], vec![1.0, 2.0, 3.0], (2, 3)).unwrap();
//! assert_eq!(csr.nnz(), 3);
//! assert_eq!(csr.spmv(&[1.0, 1.0, 1.0]).unwrap(), vec![3.0, 3.0]);
//! ```

use num_traits::Float;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CsrError {
    #[error("Invalid row pointers: length {len} for {nrows} rows (expected {expected})")]
    InvalidRowPtr {
        len: usize,
        nrows: usize,
        expected: usize,
    },

    #[error("Row pointer not sorted at index {idx}: {curr} > {next}")]
    RowPtrNotSorted {
        idx: usize,
        curr: usize,
        next: usize,
    },

    #[error("Row pointers must start at 0 and end at nnz ({nnz}), got {first}..{last}")]
    RowPtrBounds { first: usize, last: usize, nnz: usize },

    #[error("Length mismatch: {col_indices} col_indices but {values} values")]
    LengthMismatch { col_indices: usize, values: usize },

    #[error("Column index out of bounds: {col_idx} >= {ncols}")]
    ColIndexOutOfBounds { col_idx: usize, ncols: usize },

    #[error("Shape mismatch: matrix is {nrows}×{ncols}, vector has length {vec_len}")]
    ShapeMismatch {
        nrows: usize,
        ncols: usize,
        vec_len: usize,
    },
}

/// CSR (Compressed Sparse Row) matrix
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix<T> {
    /// Row pointers: row_ptr[i] = start index of row i in col_indices/values
    /// Length: nrows + 1, with row_ptr[nrows] = nnz
    row_ptr: Vec<usize>,

    /// Column indices for each non-zero element
    col_indices: Vec<usize>,

    /// Values of non-zero elements
    values: Vec<T>,

    /// Shape: (nrows, ncols)
    shape: (usize, usize),
}

impl<T> CsrMatrix<T> {
    /// Create a new CSR matrix
    ///
    /// Matrices with zero rows are accepted (`row_ptr == [0]`); they arise
    /// from empty tensors.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - row_ptr length is not nrows+1
    /// - col_indices and values have different lengths
    /// - row_ptr does not start at 0, end at nnz, or decreases
    /// - any column index is out of bounds
    pub fn new(
        row_ptr: Vec<usize>,
        col_indices: Vec<usize>,
        values: Vec<T>,
        shape: (usize, usize),
    ) -> Result<Self, CsrError> {
        let (nrows, ncols) = shape;

        if row_ptr.len() != nrows + 1 {
            return Err(CsrError::InvalidRowPtr {
                len: row_ptr.len(),
                nrows,
                expected: nrows + 1,
            });
        }

        if col_indices.len() != values.len() {
            return Err(CsrError::LengthMismatch {
                col_indices: col_indices.len(),
                values: values.len(),
            });
        }

        let nnz = col_indices.len();
        if row_ptr[0] != 0 || row_ptr[nrows] != nnz {
            return Err(CsrError::RowPtrBounds {
                first: row_ptr[0],
                last: row_ptr[nrows],
                nnz,
            });
        }

        if let Some(idx) = row_ptr.windows(2).position(|w| w[0] > w[1]) {
            return Err(CsrError::RowPtrNotSorted {
                idx,
                curr: row_ptr[idx],
                next: row_ptr[idx + 1],
            });
        }

        if let Some(&col_idx) = col_indices.iter().find(|&&c| c >= ncols) {
            return Err(CsrError::ColIndexOutOfBounds { col_idx, ncols });
        }

        Ok(Self {
            row_ptr,
            col_indices,
            values,
            shape,
        })
    }

    /// Number of non-zero elements
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Shape of the matrix (nrows, ncols)
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.shape.0
    }

    /// Number of columns
    pub fn ncols(&self) -> usize {
        self.shape.1
    }

    /// Get row pointers
    pub fn row_ptr(&self) -> &[usize] {
        &self.row_ptr
    }

    /// Get column indices
    pub fn col_indices(&self) -> &[usize] {
        &self.col_indices
    }

    /// Get values
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Compute density (nnz / total_elements)
    pub fn density(&self) -> f64 {
        let total = self.nrows() as f64 * self.ncols() as f64;
        if total == 0.0 {
            return 0.0;
        }
        self.nnz() as f64 / total
    }

    /// Get a row as (col_indices, values) slices
    pub fn row(&self, i: usize) -> Option<(&[usize], &[T])> {
        if i >= self.nrows() {
            return None;
        }

        let start = self.row_ptr[i];
        let end = self.row_ptr[i + 1];

        Some((&self.col_indices[start..end], &self.values[start..end]))
    }

    /// Consume the matrix, returning `(row_ptr, col_indices, values)`
    pub fn into_parts(self) -> (Vec<usize>, Vec<usize>, Vec<T>) {
        (self.row_ptr, self.col_indices, self.values)
    }
}

impl<T: Float> CsrMatrix<T> {
    /// Sparse matrix-vector product y = A * x
    ///
    /// # Complexity
    ///
    /// O(nnz)
    pub fn spmv(&self, x: &[T]) -> Result<Vec<T>, CsrError> {
        if x.len() != self.ncols() {
            return Err(CsrError::ShapeMismatch {
                nrows: self.nrows(),
                ncols: self.ncols(),
                vec_len: x.len(),
            });
        }

        let y = self
            .row_ptr
            .windows(2)
            .map(|w| {
                (w[0]..w[1]).fold(T::zero(), |sum, idx| {
                    sum + self.values[idx] * x[self.col_indices[idx]]
                })
            })
            .collect();

        Ok(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CsrMatrix<f64> {
        // [1.0  0   2.0  0  ]
        // [0    3.0 0    0  ]
        // [4.0  0   0    5.0]
        CsrMatrix::new(
            vec![0, 2, 3, 5],
            vec![0, 2, 1, 0, 3],
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            (3, 4),
        )
        .unwrap()
    }

    #[test]
    fn test_csr_creation() {
        let csr = sample();
        assert_eq!(csr.nnz(), 5);
        assert_eq!(csr.shape(), (3, 4));
        assert_eq!(csr.nrows(), 3);
        assert_eq!(csr.ncols(), 4);
        assert!((csr.density() - 5.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_csr_row_access() {
        let csr = sample();
        let (cols, vals) = csr.row(2).unwrap();
        assert_eq!(cols, &[0, 3]);
        assert_eq!(vals, &[4.0, 5.0]);
        assert!(csr.row(3).is_none());
    }

    #[test]
    fn test_csr_zero_rows() {
        let csr = CsrMatrix::<f64>::new(vec![0], vec![], vec![], (0, 4)).unwrap();
        assert_eq!(csr.nnz(), 0);
        assert_eq!(csr.density(), 0.0);
        assert_eq!(csr.spmv(&[1.0; 4]).unwrap(), Vec::<f64>::new());
    }

    #[test]
    fn test_csr_invalid_row_ptr() {
        let err = CsrMatrix::new(vec![0, 1], vec![0], vec![1.0], (2, 2)).unwrap_err();
        assert!(matches!(err, CsrError::InvalidRowPtr { expected: 3, .. }));

        let err = CsrMatrix::new(vec![0, 1, 2], vec![0], vec![1.0], (2, 2)).unwrap_err();
        assert!(matches!(err, CsrError::RowPtrBounds { last: 2, nnz: 1, .. }));

        let err = CsrMatrix::new(vec![0, 2, 1, 2], vec![0, 1], vec![1.0, 2.0], (3, 2)).unwrap_err();
        assert!(matches!(err, CsrError::RowPtrNotSorted { idx: 1, .. }));
    }

    #[test]
    fn test_csr_invalid_columns() {
        let err = CsrMatrix::new(vec![0, 1], vec![5], vec![1.0], (1, 2)).unwrap_err();
        assert_eq!(err, CsrError::ColIndexOutOfBounds { col_idx: 5, ncols: 2 });

        let err = CsrMatrix::new(vec![0, 1], vec![0], vec![1.0, 2.0], (1, 2)).unwrap_err();
        assert!(matches!(err, CsrError::LengthMismatch { .. }));
    }

    #[test]
    fn test_csr_spmv() {
        let csr = sample();
        let y = csr.spmv(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(y, vec![7.0, 6.0, 24.0]);

        assert!(matches!(
            csr.spmv(&[1.0, 2.0]),
            Err(CsrError::ShapeMismatch { vec_len: 2, .. })
        ));
    }

    #[test]
    fn test_csr_into_parts() {
        let (row_ptr, cols, vals) = sample().into_parts();
        assert_eq!(row_ptr, vec![0, 2, 3, 5]);
        assert_eq!(cols, vec![0, 2, 1, 0, 3]);
        assert_eq!(vals.len(), 5);
    }
}

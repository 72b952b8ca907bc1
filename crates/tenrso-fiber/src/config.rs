//! Build configuration for fiber tensors

/// Configuration for fiber tensor construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiberConfig {
    /// Build independent modes concurrently (requires the `parallel` feature)
    pub enable_parallel: bool,
    /// Minimum nonzero count before parallel construction is used.
    /// Set to 0 to always go parallel when enabled.
    pub min_nnz_for_parallel: usize,
    /// Verify the sortedness precondition before each mode is built
    pub check_sorted: bool,
    /// Run the structural invariant checks after each mode is built
    pub validate_structure: bool,
}

impl FiberConfig {
    /// Create new build configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel per-mode construction
    pub fn parallel(mut self, enable: bool) -> Self {
        self.enable_parallel = enable;
        self
    }

    /// Set the adaptive parallel threshold
    pub fn min_nnz_for_parallel(mut self, nnz: usize) -> Self {
        self.min_nnz_for_parallel = nnz;
        self
    }

    /// Enable or disable the sortedness check
    pub fn check_sorted(mut self, enable: bool) -> Self {
        self.check_sorted = enable;
        self
    }

    /// Enable or disable post-build invariant checks
    pub fn validate_structure(mut self, enable: bool) -> Self {
        self.validate_structure = enable;
        self
    }

    /// Whether a tensor with `nnz` nonzeros should be built in parallel
    pub fn use_parallel(&self, nnz: usize) -> bool {
        cfg!(feature = "parallel") && self.enable_parallel && nnz >= self.min_nnz_for_parallel
    }
}

impl Default for FiberConfig {
    fn default() -> Self {
        Self {
            enable_parallel: true,
            min_nnz_for_parallel: 10_000,
            check_sorted: cfg!(debug_assertions),
            validate_structure: cfg!(debug_assertions),
        }
    }
}
